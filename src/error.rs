/// Errors surfaced by the Noise255 ciphersuite, box codec, context, and
/// handshake roles.
///
/// Every fallible public operation in this crate returns one of these
/// variants; none are ever swallowed internally.
#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    /// Poly1305 verification failed while decrypting. No plaintext is
    /// produced, and any chain-variable/counter mutation scheduled after
    /// the failing derivation is not applied.
    #[error("ciphertext MAC indicates tampering")]
    MacMismatch,

    /// A `Shut`/`Open` call used a `kdf_id` incompatible with the
    /// context's monotonic counter.
    #[error("counter out of sync: context is at {actual}, operation required {expected}")]
    CounterOutOfSync { expected: i8, actual: i8 },

    /// A caller supplied a byte slice of the wrong length to a
    /// fixed-size API (e.g. a truncated box, or a key of the wrong size).
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl NoiseError {
    pub(crate) fn invalid_length(expected: usize, actual: usize) -> Self {
        NoiseError::InvalidLength { expected, actual }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NoiseError>;
