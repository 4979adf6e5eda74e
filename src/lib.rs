//! Noise255: the Curve25519/ChaCha20/Poly1305/HMAC-SHA512 ciphersuite, its
//! self-rekeying authenticated encryption, the `Box` wire framing built on
//! top of it, and the client/server handshake roles that produce a shared
//! chain variable.
//!
//! This crate is the cryptographic core only: no transport, no socket
//! handling, no CLI. A caller drives bytes in and out of a `BoxContext` or
//! a `ClientHandshake`/`ServerHandshake` over whatever channel it already
//! has.

#![forbid(unsafe_code)]

mod box_codec;
mod ciphersuite;
mod context;
mod error;
mod kdf;
mod primitives;
mod secret;

mod handshake;

pub use ciphersuite::{
    Ciphersuite, CipherContext, Keypair, Noise255, PrivateKey, PublicKey, SymmetricKey, CC_LEN,
    CV_LEN, DH_LEN, KEY_LEN, IV_LEN, MAC_LEN, NAME_LEN,
};
pub use context::BoxContext;
pub use error::{NoiseError, Result};
pub use handshake::{ClientHandshake, ServerHandshake};
pub use secret::Secret;
