//! An HKDF-like expand construction over HMAC-SHA512, producing an output
//! of arbitrary length from a `secret`, an `extra` chaining input, and an
//! `info` label.
//!
//! This mirrors the original `ciphersuite.kdf` exactly: the scratch
//! message buffer is built once with fixed offsets, and only the
//! one-byte block counter and the 32-byte "previous block" window are
//! rewritten on each iteration.

use crate::primitives::hmac_sha512;
use crate::secret::Secret;

const HASH_LEN: usize = 64;
const PREV_T_LEN: usize = 32;

/// Derives `out_len` bytes from `secret`, `extra`, and `info`.
///
/// The scratch message buffer and the untrimmed output both live in
/// `Secret`s, so they're wiped when this function returns (the trimmed
/// output is handed back to the caller, who owns its wipe-on-drop from
/// then on).
pub fn kdf(secret: &[u8], extra: &[u8], info: &[u8], out_len: usize) -> Secret {
    let blocks = (out_len + HASH_LEN - 1) / HASH_LEN;

    let c_offset = info.len();
    let t_offset = c_offset + 1;
    let e_offset = t_offset + PREV_T_LEN;
    let message_len = e_offset + extra.len();

    let mut message = Secret::new(message_len);
    {
        let m = message.write();
        m[..info.len()].copy_from_slice(info);
        // m[c_offset] stays 0 (c = 0 on the first iteration).
        // m[t_offset..t_offset + 32] stays 0 (prevT32 is 32 zero bytes
        // for c = 0).
        m[e_offset..].copy_from_slice(extra);
    }

    let mut output = Secret::new(blocks * HASH_LEN);

    for c in 0..blocks {
        message.write()[c_offset] = c as u8;

        let block = hmac_sha512(secret, message.read());
        output.write()[c * HASH_LEN..(c + 1) * HASH_LEN].copy_from_slice(&block);

        if c + 1 < blocks {
            message.write()[t_offset..t_offset + PREV_T_LEN].copy_from_slice(&block[..PREV_T_LEN]);
        }
    }

    output.trim(out_len);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vector {
        secret: &'static [u8],
        extra: &'static [u8],
        info: &'static [u8],
        out_len: usize,
        out: &'static [u8],
    }

    const VECTORS: &[Vector] = &[
        Vector {
            secret: b"",
            extra: b"",
            info: b"",
            out_len: 8,
            out: &[0x39, 0xa9, 0x19, 0x6f, 0x32, 0xae, 0xe7, 0x39],
        },
        Vector {
            secret: &[0x00],
            extra: &[0x00],
            info: &[0x00],
            out_len: 8,
            out: &[0xc4, 0x90, 0xf6, 0xe4, 0x6a, 0xe8, 0x1a, 0xbb],
        },
        Vector {
            secret: &[0x00],
            extra: &[0x00],
            info: &[0x00],
            out_len: 16,
            out: &[
                0xc4, 0x90, 0xf6, 0xe4, 0x6a, 0xe8, 0x1a, 0xbb, 0x59, 0x01, 0x32, 0xc6, 0xf1, 0x40,
                0xb3, 0x7e,
            ],
        },
        Vector {
            secret: b"secret",
            extra: b"extra",
            info: b"info",
            out_len: 8,
            out: &[0xad, 0x5c, 0x1b, 0x3f, 0x13, 0xce, 0x4b, 0x45],
        },
        Vector {
            secret: &[0x00, 0x01, 0x02, 0x03],
            extra: &[0x04, 0x05, 0x06, 0x07],
            info: &[0x08, 0x09, 0x0a, 0x0b],
            out_len: 3,
            out: &[0x47, 0x5a, 0xae],
        },
        Vector {
            secret: &[0xff, 0xff, 0xff, 0xff],
            extra: &[0xee, 0xee, 0xee, 0xee],
            info: &[0xdd, 0xdd, 0xdd, 0xdd],
            out_len: 128,
            out: &[
                0x8d, 0x60, 0xe9, 0x6a, 0x29, 0xb6, 0x96, 0x2f, 0xf4, 0x59, 0xea, 0xf0, 0x5a, 0x3e,
                0xd2, 0xf1, 0x82, 0x80, 0x63, 0xc6, 0xee, 0x93, 0x66, 0x2d, 0x89, 0xab, 0xb2, 0xff,
                0x56, 0xb6, 0x97, 0xd2, 0x78, 0x27, 0xbe, 0x44, 0xf9, 0xc4, 0xab, 0xad, 0x58, 0x0d,
                0x4f, 0xfe, 0x86, 0x68, 0x80, 0xba, 0xb4, 0xbd, 0x5f, 0xc1, 0xa3, 0xec, 0xd9, 0x48,
                0xa3, 0x24, 0x35, 0xa2, 0xde, 0x5e, 0xab, 0x1d, 0x76, 0x86, 0xc2, 0x3c, 0x4f, 0xf9,
                0x88, 0xc1, 0xf8, 0x1d, 0x10, 0xe8, 0x94, 0x41, 0x8e, 0xe2, 0x5a, 0xa8, 0x59, 0xaf,
                0xad, 0x08, 0xea, 0x4f, 0xfe, 0x5f, 0x5c, 0x66, 0x91, 0x13, 0xde, 0x4a, 0x75, 0xc9,
                0x16, 0xd3, 0x9e, 0x72, 0x67, 0x8b, 0x7f, 0x04, 0x10, 0x4b, 0x0c, 0x66, 0x34, 0xcc,
                0x37, 0x1a, 0xe7, 0x0e, 0x8d, 0x4a, 0x46, 0x9d, 0x1f, 0x54, 0xe6, 0x9e, 0xf7, 0x33,
                0x63, 0x3b,
            ],
        },
    ];

    #[test]
    fn kdf_matches_test_vectors() {
        for v in VECTORS {
            let out = kdf(v.secret, v.extra, v.info, v.out_len);
            assert_eq!(out.read(), v.out, "kdf({:?}, {:?}, {:?}, {})", v.secret, v.extra, v.info, v.out_len);
        }
    }

    #[test]
    fn kdf_is_deterministic() {
        let a = kdf(b"secret", b"extra", b"info", 37);
        let b = kdf(b"secret", b"extra", b"info", 37);
        assert_eq!(a.read(), b.read());
    }

    #[test]
    fn kdf_output_is_a_length_prefix() {
        let short = kdf(b"secret", b"extra", b"info", 8);
        let long = kdf(b"secret", b"extra", b"info", 40);
        assert_eq!(short.read(), &long.read()[..8]);
    }

    #[test]
    fn kdf_zero_length_output_is_empty() {
        let out = kdf(b"secret", b"extra", b"info", 0);
        assert!(out.is_empty());
    }
}
