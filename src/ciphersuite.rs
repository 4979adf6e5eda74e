//! Names the algorithms, exposes fixed lengths, builds key pairs, computes
//! DH shared secrets, encrypts/decrypts with self-rekey, and derives new
//! chain/cipher-context pairs.
//!
//! `Ciphersuite` factors the suite into "parameters + methods that compose
//! primitives": a hypothetical variant suite (a different DH curve, AEAD,
//! or KDF hash) implements the same trait without the Box Codec or Box
//! Context ever needing to change. `Noise255` is the one suite this crate
//! ships.

use byteorder::{ByteOrder, LittleEndian};
use std::convert::TryInto;
use std::fmt;

use crate::error::{NoiseError, Result};
use crate::kdf::kdf;
use crate::primitives::{chacha20_xor, poly1305_mac, poly1305_verify, random_bytes, x25519, x25519_base};
use crate::secret::Secret;

/// Curve25519 public/private/DH output length.
pub const DH_LEN: usize = 32;
/// ChaCha20 key length.
pub const KEY_LEN: usize = 32;
/// ChaCha20 IV length.
pub const IV_LEN: usize = 8;
/// Cipher context length: `KEY_LEN + IV_LEN`.
pub const CC_LEN: usize = KEY_LEN + IV_LEN;
/// Chain variable length.
pub const CV_LEN: usize = 48;
/// Poly1305 tag length.
pub const MAC_LEN: usize = 16;
/// Suite name length, zero-padded.
pub const NAME_LEN: usize = 24;

/// A Curve25519 public key. Not secret, so unlike `PrivateKey`/
/// `SymmetricKey` it is a plain `Copy` byte array rather than a `Secret`:
/// zeroizing public data on drop buys nothing. It keeps the same
/// constructor/accessor shape (`from_bytes`/`as_bytes`/fixed length) so
/// call sites read the same regardless of which key type they hold.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; DH_LEN]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; DH_LEN]) -> Self {
        PublicKey(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; DH_LEN] = bytes
            .try_into()
            .map_err(|_| NoiseError::invalid_length(DH_LEN, bytes.len()))?;
        Ok(PublicKey(arr))
    }

    pub fn zero() -> Self {
        PublicKey([0u8; DH_LEN])
    }

    pub fn as_bytes(&self) -> &[u8; DH_LEN] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// A Curve25519 private key. Secret: held in a `Secret` and zeroized on
/// drop.
pub struct PrivateKey(Secret);

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; DH_LEN]) -> Self {
        PrivateKey(Secret::from_bytes(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> [u8; DH_LEN] {
        let mut out = [0u8; DH_LEN];
        out.copy_from_slice(self.0.read());
        out
    }

    /// Zeroizes the key material in place without waiting for drop.
    pub(crate) fn wipe(&mut self) {
        self.0.wipe();
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        PrivateKey(self.0.clone())
    }
}

/// A Diffie-Hellman shared secret. Secret: held in a `Secret` and
/// zeroized on drop.
pub struct SymmetricKey(Secret);

impl SymmetricKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.read()
    }
}

/// An exclusive `(PrivateKey, PublicKey)` pair, owned by exactly one Box
/// Context.
pub struct Keypair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Keypair { private: self.private.clone(), public: self.public }
    }
}

/// A cipher context: a short-lived key+IV pair, `CC_LEN` bytes, used for
/// exactly one AEAD call before being replaced by a self-rekey step.
pub struct CipherContext(Secret);

impl CipherContext {
    pub fn new(bytes: [u8; CC_LEN]) -> Self {
        CipherContext(Secret::from_bytes(bytes.to_vec()))
    }

    fn key(&self) -> [u8; KEY_LEN] {
        let mut k = [0u8; KEY_LEN];
        k.copy_from_slice(&self.0.read()[..KEY_LEN]);
        k
    }

    fn iv(&self) -> [u8; IV_LEN] {
        let mut v = [0u8; IV_LEN];
        v.copy_from_slice(&self.0.read()[KEY_LEN..CC_LEN]);
        v
    }

    fn set(&mut self, bytes: [u8; CC_LEN]) {
        self.0.write().copy_from_slice(&bytes);
    }
}

/// Composes the Primitive Provider and the KDF into the concrete
/// operations a Box Context needs. Everything but `new_keypair` and `dh`
/// has a default implementation built from the Noise255 framing; a
/// variant suite only needs to override what actually differs.
pub trait Ciphersuite {
    /// 24-byte, zero-padded suite name mixed into every KDF `info`.
    const NAME: [u8; NAME_LEN];

    fn new_keypair() -> Keypair;
    fn dh(private: &PrivateKey, public: &PublicKey) -> SymmetricKey;

    /// Encrypts `plaintext` under `cc`, authenticating `authtext`, and
    /// rekeys `cc` in place before returning `ciphertext ‖ mac`.
    fn encrypt(cc: &mut CipherContext, plaintext: &[u8], authtext: &[u8]) -> Vec<u8> {
        let key = cc.key();
        let iv = cc.iv();

        let mac_key = derive_mac_key(&key, &iv);

        let mut ciphertext = vec![0u8; plaintext.len()];
        chacha20_xor(&mut ciphertext, &key, &iv, plaintext, 1);

        let formatted = poly1305_format(&ciphertext, authtext);
        let tag = poly1305_mac(&mac_key, &formatted);

        rekey(cc, &key);

        ciphertext.extend_from_slice(&tag);
        ciphertext
    }

    /// Verifies and decrypts `ciphertext` (which carries its trailing
    /// MAC) under `cc`, rekeying `cc` in place only on success.
    fn decrypt(cc: &mut CipherContext, ciphertext: &[u8], authtext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < MAC_LEN {
            return Err(NoiseError::invalid_length(MAC_LEN, ciphertext.len()));
        }

        let key = cc.key();
        let iv = cc.iv();
        let mac_key = derive_mac_key(&key, &iv);

        let split = ciphertext.len() - MAC_LEN;
        let (body, tag_bytes) = ciphertext.split_at(split);
        let tag: [u8; MAC_LEN] = tag_bytes.try_into().expect("split at len - MAC_LEN");

        let formatted = poly1305_format(body, authtext);
        if !poly1305_verify(&mac_key, &formatted, &tag) {
            return Err(NoiseError::MacMismatch);
        }

        let mut plaintext = vec![0u8; body.len()];
        chacha20_xor(&mut plaintext, &key, &iv, body, 1);

        rekey(cc, &key);

        Ok(plaintext)
    }

    /// Absorbs a DH output into the chain variable, producing a fresh
    /// cipher context. `cv` is mutated in place to the new chain value.
    fn derive_cv_cc(cv: &mut Secret, key: &SymmetricKey, kdf_num: i8) -> CipherContext {
        let mut info = Vec::with_capacity(NAME_LEN + 1);
        info.extend_from_slice(&Self::NAME);
        info.push(kdf_num as u8);

        let out = kdf(key.as_bytes(), cv.read(), &info, CV_LEN + CC_LEN);

        cv.write().copy_from_slice(&out.read()[..CV_LEN]);

        let cc_bytes: [u8; CC_LEN] = out.read()[CV_LEN..].try_into().expect("CV_LEN + CC_LEN sized kdf output");
        CipherContext::new(cc_bytes)
    }

    /// Splits the final chain variable into the pair of cipher contexts
    /// used for post-handshake bidirectional traffic.
    fn derive_cc_cc(cv: &Secret) -> (CipherContext, CipherContext) {
        let mut info = Vec::with_capacity(NAME_LEN + 1);
        info.extend_from_slice(&Self::NAME);
        info.push(6);

        let zeros = vec![0u8; CV_LEN];
        let out = kdf(cv.read(), &zeros, &info, 2 * CC_LEN);

        let client: [u8; CC_LEN] = out.read()[..CC_LEN].try_into().expect("2 * CC_LEN sized kdf output");
        let server: [u8; CC_LEN] = out.read()[CC_LEN..].try_into().expect("2 * CC_LEN sized kdf output");

        (CipherContext::new(client), CipherContext::new(server))
    }
}

fn derive_mac_key(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> [u8; KEY_LEN] {
    let mut block = [0u8; 64];
    chacha20_xor(&mut block, key, iv, &[0u8; 64], 0);

    let mut mac_key = [0u8; KEY_LEN];
    mac_key.copy_from_slice(&block[..KEY_LEN]);
    mac_key
}

fn rekey(cc: &mut CipherContext, key: &[u8; KEY_LEN]) {
    let old_iv = cc.iv();
    let mut new_iv = [0u8; IV_LEN];
    for i in 0..IV_LEN {
        new_iv[i] = !old_iv[i];
    }

    let zeros = [0u8; CC_LEN];
    let mut new_cc = [0u8; CC_LEN];
    chacha20_xor(&mut new_cc, key, &new_iv, &zeros, 1);

    cc.set(new_cc);
}

fn pad16_len(len: usize) -> usize {
    (16 - (len % 16)) % 16
}

/// Builds the Poly1305 input:
/// `authtext ‖ pad16(authtext) ‖ ciphertext ‖ pad16(ciphertext) ‖ len(authtext) ‖ len(ciphertext)`,
/// with both lengths little-endian 64-bit.
fn poly1305_format(ciphertext: &[u8], authtext: &[u8]) -> Vec<u8> {
    let at_pad = pad16_len(authtext.len());
    let ct_pad = pad16_len(ciphertext.len());

    let mut out = Vec::with_capacity(authtext.len() + at_pad + ciphertext.len() + ct_pad + 16);
    out.extend_from_slice(authtext);
    out.resize(out.len() + at_pad, 0);
    out.extend_from_slice(ciphertext);
    out.resize(out.len() + ct_pad, 0);

    let mut len_buf = [0u8; 8];
    LittleEndian::write_u64(&mut len_buf, authtext.len() as u64);
    out.extend_from_slice(&len_buf);
    LittleEndian::write_u64(&mut len_buf, ciphertext.len() as u64);
    out.extend_from_slice(&len_buf);

    out
}

/// The Noise255 ciphersuite: Curve25519, ChaCha20, Poly1305, HMAC-SHA512.
pub struct Noise255;

impl Ciphersuite for Noise255 {
    const NAME: [u8; NAME_LEN] = {
        let mut name = [0u8; NAME_LEN];
        let bytes = b"Noise255";
        let mut i = 0;
        while i < bytes.len() {
            name[i] = bytes[i];
            i += 1;
        }
        name
    };

    fn new_keypair() -> Keypair {
        let mut private_bytes = [0u8; DH_LEN];
        random_bytes(&mut private_bytes);

        let public_bytes = x25519_base(&private_bytes);

        Keypair {
            private: PrivateKey::from_bytes(private_bytes),
            public: PublicKey::from_bytes(public_bytes),
        }
    }

    fn dh(private: &PrivateKey, public: &PublicKey) -> SymmetricKey {
        let shared = x25519(&private.as_bytes(), public.as_bytes());
        SymmetricKey(Secret::from_bytes(shared.to_vec()))
    }
}
