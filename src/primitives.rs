//! Thin, total functions over raw byte buffers: Curve25519 key generation
//! and scalar multiplication, ChaCha20 with an explicit 64-bit block
//! counter, Poly1305 one-time MAC and constant-time verification,
//! HMAC-SHA512, a cryptographic RNG, and constant-time memory equality.
//!
//! None of these functions log, allocate globally, or suspend. They take
//! fixed-size arrays wherever the Noise255 suite fixes a length, so a
//! caller passing the wrong number of bytes is a compile error rather
//! than a runtime one.

use chacha20::cipher::generic_array::GenericArray;
use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::ChaCha20Legacy;
use hmac::{Hmac, Mac};
use poly1305::universal_hash::UniversalHash;
use poly1305::Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Fills `dst` with cryptographically secure random bytes.
pub fn random_bytes(dst: &mut [u8]) {
    OsRng.fill_bytes(dst);
}

/// Scalar-base multiplication: derives a Curve25519 public key from a
/// private key.
pub fn x25519_base(private_key: &[u8; 32]) -> [u8; 32] {
    x25519_dalek::x25519(*private_key, x25519_dalek::X25519_BASEPOINT_BYTES)
}

/// Curve25519 scalar multiplication (ECDH). The all-zero output is not
/// filtered here; per the Noise spec, callers accept it as-is.
pub fn x25519(private_key: &[u8; 32], public_key: &[u8; 32]) -> [u8; 32] {
    x25519_dalek::x25519(*private_key, *public_key)
}

/// In-place ChaCha20 stream-XOR at an explicit 64-bit block index. An
/// empty `msg` is a no-op.
pub fn chacha20_xor(dst: &mut [u8], key: &[u8; 32], iv: &[u8; 8], msg: &[u8], block_counter: u64) {
    if msg.is_empty() {
        return;
    }

    dst[..msg.len()].copy_from_slice(msg);

    let mut cipher = ChaCha20Legacy::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(iv),
    );
    cipher.seek(block_counter * 64);
    cipher.apply_keystream(&mut dst[..msg.len()]);
}

/// Computes a Poly1305 one-time tag over `msg` using `key`.
pub fn poly1305_mac(key: &[u8; 32], msg: &[u8]) -> [u8; 16] {
    let mac = Poly1305::new(GenericArray::from_slice(key));
    let tag = mac.compute_unpadded(msg);

    let mut out = [0u8; 16];
    out.copy_from_slice(tag.as_slice());
    out
}

/// Verifies a Poly1305 tag in constant time.
pub fn poly1305_verify(key: &[u8; 32], msg: &[u8], tag: &[u8; 16]) -> bool {
    let computed = poly1305_mac(key, msg);
    const_time_eq(&computed, tag)
}

/// HMAC-SHA512 over `msg` with `key`, producing a 64-byte digest.
///
/// `Hmac<Sha512>` accepts a key of any length (short keys are zero
/// padded, long ones hashed down internally), so `new_from_slice` cannot
/// fail here; the `expect` documents that invariant rather than guarding
/// against a real failure mode.
pub fn hmac_sha512(key: &[u8], msg: &[u8]) -> [u8; 64] {
    let mut mac =
        HmacSha512::new_from_slice(key).expect("HMAC-SHA512 accepts a key of any length");
    mac.update(msg);

    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Constant-time byte equality: lengths are compared first (in variable
/// time, since a length mismatch reveals nothing secret), then the
/// shared-length comparison runs in constant time.
pub fn const_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}
