//! Encodes and decodes a single Box: `selfEphPub ‖ header ‖ body`, the
//! two-layer authenticated construction that carries a sender's static
//! public key and a payload under keys derived from two fresh DH outputs.
//!
//! These are free functions rather than methods on `BoxContext` because
//! they only ever touch the chain variable and a keypair or two; keeping
//! them separate from counter bookkeeping makes the counter discipline in
//! `context.rs` the only place `n` is read or advanced.

use byteorder::{ByteOrder, LittleEndian};

use crate::ciphersuite::{Ciphersuite, Keypair, PublicKey, DH_LEN, MAC_LEN};
use crate::error::{NoiseError, Result};
use crate::primitives::random_bytes;
use crate::secret::Secret;

const HEADER_CIPHERTEXT_LEN: usize = DH_LEN + MAC_LEN;

/// Encodes `data` into a box addressed to `peer_eph`, using `self_eph` for
/// the per-message ephemeral DH and `self_static` as the identity
/// revealed (under encryption) in the header. `n` is the starting KDF
/// counter for this message; the two derivations inside use `n` and
/// `n + 1`.
pub fn shut<C: Ciphersuite>(
    cv: &mut Secret,
    n: i8,
    self_eph: &Keypair,
    self_static: &Keypair,
    peer_eph: &PublicKey,
    data: &[u8],
    pad_len: u32,
) -> Vec<u8> {
    let dh1 = C::dh(&self_eph.private, peer_eph);
    let mut cc1 = C::derive_cv_cc(cv, &dh1, n);

    let dh2 = C::dh(&self_static.private, peer_eph);
    let mut cc2 = C::derive_cv_cc(cv, &dh2, n.wrapping_add(1));

    let header = C::encrypt(&mut cc1, self_static.public.as_bytes(), self_eph.public.as_bytes());

    let mut body_plain = Vec::with_capacity(data.len() + pad_len as usize + 4);
    body_plain.extend_from_slice(data);
    let pad_start = body_plain.len();
    body_plain.resize(pad_start + pad_len as usize, 0);
    random_bytes(&mut body_plain[pad_start..]);
    let mut len_buf = [0u8; 4];
    LittleEndian::write_u32(&mut len_buf, pad_len);
    body_plain.extend_from_slice(&len_buf);

    let mut authtext = Vec::with_capacity(DH_LEN + header.len());
    authtext.extend_from_slice(self_eph.public.as_bytes());
    authtext.extend_from_slice(&header);

    let body = C::encrypt(&mut cc2, &body_plain, &authtext);

    let mut out = Vec::with_capacity(DH_LEN + header.len() + body.len());
    out.extend_from_slice(self_eph.public.as_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&body);
    out
}

/// Decodes a box, returning the enclosed data, the sender's ephemeral
/// public key read from the box's first section, and the sender's
/// revealed static public key. `n` is the counter the context expects
/// this message at.
///
/// The ephemeral key is handed back rather than taken as a parameter:
/// the caller (`BoxContext::open`) has not necessarily called `init()`
/// yet — the client side of the handshake only learns the server's
/// ephemeral key by decoding `syn`, mirroring the original's
/// `*peerEphemeralKey = box[:suite.DHLen()]` assignment.
pub fn open<C: Ciphersuite>(
    cv: &mut Secret,
    n: i8,
    self_eph: &Keypair,
    boxed: &[u8],
) -> Result<(Vec<u8>, PublicKey, PublicKey)> {
    let header_end = DH_LEN + HEADER_CIPHERTEXT_LEN;
    if boxed.len() < header_end {
        return Err(NoiseError::invalid_length(header_end, boxed.len()));
    }

    let peer_eph = PublicKey::from_slice(&boxed[..DH_LEN])?;
    let header = &boxed[DH_LEN..header_end];
    let body = &boxed[header_end..];

    let dh1 = C::dh(&self_eph.private, &peer_eph);
    let mut cc1 = C::derive_cv_cc(cv, &dh1, n);

    let peer_static_bytes = C::decrypt(&mut cc1, header, peer_eph.as_bytes())?;
    let peer_static = PublicKey::from_slice(&peer_static_bytes)?;

    let dh2 = C::dh(&self_eph.private, &peer_static);
    let mut cc2 = C::derive_cv_cc(cv, &dh2, n.wrapping_add(1));

    let mut authtext = Vec::with_capacity(DH_LEN + header.len());
    authtext.extend_from_slice(peer_eph.as_bytes());
    authtext.extend_from_slice(header);

    let body_plain = C::decrypt(&mut cc2, body, &authtext)?;

    if body_plain.len() < 4 {
        return Err(NoiseError::invalid_length(4, body_plain.len()));
    }
    let pad_len = LittleEndian::read_u32(&body_plain[body_plain.len() - 4..]) as usize;
    let data_end = body_plain
        .len()
        .checked_sub(pad_len + 4)
        .ok_or_else(|| NoiseError::invalid_length(pad_len + 4, body_plain.len()))?;

    Ok((body_plain[..data_end].to_vec(), peer_eph, peer_static))
}
