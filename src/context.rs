//! The stateful half of a Noise255 session: owns the long-term and
//! ephemeral keypairs, the evolving chain variable, and the monotonic KDF
//! counter, and sequences `shut`/`open` calls against it.
//!
//! A `BoxContext` is single-owner and not `Sync`: every `shut`/`open`
//! mutates the chain variable, the counter, and (inside the box codec)
//! fresh cipher contexts, so concurrent use from more than one thread is
//! a caller bug, not something this type guards against at runtime.

use std::marker::PhantomData;

use log::trace;

use crate::box_codec;
use crate::ciphersuite::{Ciphersuite, Keypair, PublicKey, CV_LEN};
use crate::error::{NoiseError, Result};
use crate::secret::Secret;

pub struct BoxContext<C: Ciphersuite> {
    self_long_term: Keypair,
    self_ephemeral: Keypair,
    peer_eph: Option<PublicKey>,
    peer_static: PublicKey,
    cv: Secret,
    n: i8,
    _suite: PhantomData<C>,
}

impl<C: Ciphersuite> BoxContext<C> {
    /// `self_key` absent generates a fresh keypair and uses it as both
    /// the long-term and the ephemeral identity; otherwise a fresh
    /// ephemeral keypair is generated alongside the supplied long-term
    /// one. `counter_start` sets the initial KDF counter to
    /// `2 * counter_start`.
    pub fn new(self_key: Option<Keypair>, counter_start: i8) -> Self {
        let (self_long_term, self_ephemeral) = match self_key {
            Some(key) => {
                let ephemeral = C::new_keypair();
                (key, ephemeral)
            }
            None => {
                let key = C::new_keypair();
                (key.clone(), key)
            }
        };

        BoxContext {
            self_long_term,
            self_ephemeral,
            peer_eph: None,
            peer_static: PublicKey::zero(),
            cv: Secret::new(CV_LEN),
            n: counter_start.wrapping_mul(2),
            _suite: PhantomData,
        }
    }

    pub fn ephemeral_public_key(&self) -> [u8; 32] {
        *self.self_ephemeral.public.as_bytes()
    }

    /// Zero bytes until the first successful `open`.
    pub fn peer_public_key(&self) -> [u8; 32] {
        *self.peer_static.as_bytes()
    }

    /// Records the peer's ephemeral public key. Must be called before
    /// the first `shut`/`open` that needs it.
    pub fn init(&mut self, peer_eph: PublicKey) {
        self.peer_eph = Some(peer_eph);
    }

    /// Read-only access to the evolved chain variable, so a caller can
    /// run `Ciphersuite::derive_cc_cc` on it once the handshake is done
    /// without reaching into this context's other fields.
    pub fn chain_variable(&self) -> &Secret {
        &self.cv
    }

    /// Encodes `data` into a box addressed to the peer ephemeral key set
    /// by `init` (directly, or learned from a prior successful `open`).
    /// Requires a peer ephemeral key to already be known and the counter
    /// to be at or before `2 * kdf_id`; after a successful call it is
    /// exactly `2 * kdf_id + 2`.
    pub fn shut(&mut self, data: &[u8], kdf_id: i8, pad_len: u32) -> Result<Vec<u8>> {
        let start_n = kdf_id.wrapping_mul(2);

        // No peer ephemeral key yet means no `init`/`open` has ever run
        // on this context: there is nothing to address a box to, and
        // the `n <= 2*kdf_id` check alone cannot see this, since `n` is
        // preset to `2 * counterStart` at construction rather than 0.
        let peer_eph = match self.peer_eph.as_ref() {
            Some(peer_eph) => peer_eph,
            None => {
                return Err(NoiseError::CounterOutOfSync { expected: start_n, actual: 0 });
            }
        };

        if self.n > start_n {
            return Err(NoiseError::CounterOutOfSync { expected: start_n, actual: self.n });
        }
        trace!("BoxContext::shut n={} kdf_id={}", self.n, kdf_id);

        let boxed = box_codec::shut::<C>(
            &mut self.cv,
            start_n,
            &self.self_ephemeral,
            &self.self_long_term,
            peer_eph,
            data,
            pad_len,
        );

        self.n = start_n.wrapping_add(2);
        Ok(boxed)
    }

    /// Decodes `boxed`. Requires the counter to be exactly `2 * kdf_id`;
    /// on success it becomes `2 * kdf_id + 2`, the sender's ephemeral
    /// public key read from the box replaces `peer_eph` (mirroring the
    /// original's `*peerEphemeralKey = box[:suite.DHLen()]` assignment —
    /// the client side of a handshake never calls `init` itself, only
    /// learns the server's ephemeral key this way), and the sender's
    /// static public key becomes visible through `peer_public_key`.
    pub fn open(&mut self, boxed: &[u8], kdf_id: i8) -> Result<Vec<u8>> {
        let start_n = kdf_id.wrapping_mul(2);
        if self.n != start_n {
            return Err(NoiseError::CounterOutOfSync { expected: start_n, actual: self.n });
        }
        trace!("BoxContext::open n={} kdf_id={}", self.n, kdf_id);

        let (data, peer_eph, peer_static) =
            match box_codec::open::<C>(&mut self.cv, start_n, &self.self_ephemeral, boxed) {
                Ok(result) => result,
                Err(err) => {
                    trace!("BoxContext::open failed: {}", err);
                    return Err(err);
                }
            };

        self.peer_eph = Some(peer_eph);
        self.peer_static = peer_static;
        self.n = start_n.wrapping_add(2);
        Ok(data)
    }

    /// Wipes every owned secret and resets the counter and peer slots.
    /// Also run implicitly by `Drop`.
    pub fn terminate(&mut self) {
        self.self_long_term.private.wipe();
        self.self_ephemeral.private.wipe();
        self.cv.wipe();
        self.n = 0;
        self.peer_eph = None;
        self.peer_static = PublicKey::zero();
    }
}

impl<C: Ciphersuite> Drop for BoxContext<C> {
    fn drop(&mut self) {
        self.terminate();
    }
}
