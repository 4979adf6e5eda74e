//! A small abstraction for holding "secret" byte regions: private keys, DH
//! outputs, chain variables, and cipher contexts all live in a `Secret`
//! rather than a bare `Vec<u8>`, so that zeroization-on-drop is automatic
//! and accidental logging/`Debug`-printing of the bytes is a deliberate
//! act rather than a default derive.
//!
//! Real page-locking (`mlock`/`VirtualLock`) is not implemented here: the
//! upstream Go implementation gets it from `go.secrets`, which this crate
//! has no pure-Rust equivalent dependency for. `lock()` is kept as a named
//! operation (a no-op beyond dropping the access window) so the API shape
//! matches the original and a platform-specific backend could be slotted
//! in later without changing call sites.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// A byte buffer that is zeroized when dropped.
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Allocates a new all-zero secret of the given length.
    pub fn new(len: usize) -> Self {
        Secret { bytes: vec![0u8; len] }
    }

    /// Takes ownership of an existing buffer as a secret.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Secret { bytes: bytes.into() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Opens a read-only access window onto the secret bytes.
    pub fn read(&self) -> &[u8] {
        &self.bytes
    }

    /// Opens a mutable access window onto the secret bytes.
    pub fn write(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Identical to `write`; kept as a separate name to mirror the
    /// `ReadWrite` operation the original `secrets.Secret` type exposes.
    pub fn read_write(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Closes the current access window. A no-op in this pure-Rust
    /// implementation (there is no page-protection to re-apply), kept so
    /// call sites read the same as the page-locked original.
    pub fn lock(&mut self) {}

    /// Immediately zeroizes the buffer in place without deallocating it.
    pub fn wipe(&mut self) {
        self.bytes.zeroize();
    }

    /// Constant-time equality; always compares the full length of both
    /// buffers before returning, even when lengths differ.
    pub fn eq(&self, other: &Secret) -> bool {
        self.bytes.len() == other.bytes.len() && self.bytes.ct_eq(&other.bytes).into()
    }

    /// Shrinks the secret to `new_len`, zeroizing the discarded tail
    /// before truncating.
    pub fn trim(&mut self, new_len: usize) {
        if new_len < self.bytes.len() {
            self.bytes[new_len..].zeroize();
        }
        self.bytes.truncate(new_len);
    }

    /// Splits off a new `Secret` containing `self[at..]`, leaving `self`
    /// holding `self[..at]`.
    pub fn split(&mut self, at: usize) -> Secret {
        let tail = self.bytes.split_off(at);
        Secret { bytes: tail }
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Secret { bytes: self.bytes.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zero_filled() {
        let s = Secret::new(8);
        assert_eq!(s.read(), &[0u8; 8]);
    }

    #[test]
    fn wipe_zeroes_in_place() {
        let mut s = Secret::from_bytes(vec![1, 2, 3, 4]);
        s.wipe();
        assert_eq!(s.read(), &[0, 0, 0, 0]);
    }

    #[test]
    fn trim_zeroes_discarded_tail_and_shrinks() {
        let mut s = Secret::from_bytes(vec![1, 2, 3, 4]);
        s.trim(2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.read(), &[1, 2]);
    }

    #[test]
    fn split_divides_buffer() {
        let mut s = Secret::from_bytes(vec![1, 2, 3, 4]);
        let tail = s.split(2);
        assert_eq!(s.read(), &[1, 2]);
        assert_eq!(tail.read(), &[3, 4]);
    }

    #[test]
    fn eq_is_length_and_content_sensitive() {
        let a = Secret::from_bytes(vec![1, 2, 3]);
        let b = Secret::from_bytes(vec![1, 2, 3]);
        let c = Secret::from_bytes(vec![1, 2, 4]);
        let d = Secret::from_bytes(vec![1, 2]);
        assert!(a.eq(&b));
        assert!(!a.eq(&c));
        assert!(!a.eq(&d));
    }
}
