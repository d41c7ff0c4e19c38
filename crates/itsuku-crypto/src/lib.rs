//! Shared hashing and bit-counting substrate for the Itsuku memory-hard PoW.
//!
//! Every other crate in this workspace goes through [`digest64`] for its
//! keyless, variable-length hashing needs, and through [`leading_zero_bits`]
//! for the difficulty check. Keeping both in one place guarantees the
//! prover and the verifier are byte-for-byte in lock step: any substitution
//! here changes every byte of memory and every proof.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use std::io::Read;

/// Width, in bytes, of every hash output produced by [`digest64`].
pub const DIGEST_LEN: usize = 64;

/// Keyless, deterministic 64-byte digest over the concatenation of `parts`.
///
/// This is the single hash primitive used everywhere in the PoW: it seeds
/// memory elements, compresses antecedents, hashes Merkle leaves and
/// intermediates, and drives the nonce-search walk. Implemented as a BLAKE3
/// extendable-output hash widened to exactly 64 bytes.
#[must_use]
pub fn digest64(parts: &[&[u8]]) -> [u8; DIGEST_LEN] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; DIGEST_LEN];
    hasher
        .finalize_xof()
        .read_exact(&mut out)
        .expect("blake3 XOF reader never fails for a fixed-size buffer");
    out
}

/// Incremental variant of [`digest64`] for callers that must interleave
/// absorbs with other work (the omega computation feeds several
/// intermediate walk digests in reverse order, then one more element,
/// before finalizing).
#[derive(Clone, Debug, Default)]
pub struct Digest64Builder {
    hasher: blake3::Hasher,
}

impl Digest64Builder {
    /// Start a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    /// Absorb one more chunk of bytes.
    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self
    }

    /// Consume the builder and produce the 64-byte digest.
    #[must_use]
    pub fn finalize(&self) -> [u8; DIGEST_LEN] {
        let mut out = [0u8; DIGEST_LEN];
        self.hasher
            .finalize_xof()
            .read_exact(&mut out)
            .expect("blake3 XOF reader never fails for a fixed-size buffer");
        out
    }
}

/// Truncate a 64-byte digest to the first `width` bytes.
///
/// Used by the Merkle builder, whose node width is derived from difficulty
/// and search length and is almost always narrower than a full digest.
#[must_use]
pub fn truncate(digest: &[u8; DIGEST_LEN], width: usize) -> Vec<u8> {
    debug_assert!(width <= DIGEST_LEN, "node width must not exceed digest width");
    digest[..width.min(DIGEST_LEN)].to_vec()
}

/// Count leading zero bits across the concatenation `b[0] ‖ b[1] ‖ …`.
///
/// This is the difficulty predicate: a proof is accepted iff
/// `leading_zero_bits(omega) >= difficulty_bits`.
#[must_use]
pub fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut count = 0u32;
    for &byte in bytes {
        if byte == 0 {
            count += 8;
            continue;
        }
        count += byte.leading_zeros();
        break;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::{digest64, leading_zero_bits};

    #[test]
    fn digest64_is_deterministic() {
        let a = digest64(&[b"hello", b" ", b"world"]);
        let b = digest64(&[b"hello", b" ", b"world"]);
        assert_eq!(a, b);
    }

    #[test]
    fn digest64_has_no_implicit_part_framing() {
        // Parts are hashed as a flat concatenation with no length prefix,
        // so callers that need boundary separation must supply it themselves.
        let a = digest64(&[b"he", b"llo"]);
        let b = digest64(&[b"h", b"ello"]);
        assert_eq!(a, b);
    }

    #[test]
    fn leading_zeros_matches_expected_counts() {
        assert_eq!(leading_zero_bits(&[0x00, 0x00, 0x80, 0x00]), 16);
        assert_eq!(leading_zero_bits(&[0x00, 0x01, 0x00, 0x00]), 15);
        assert_eq!(leading_zero_bits(&[0x10, 0x00, 0x00, 0x00]), 3);
        assert_eq!(leading_zero_bits(&[0x00, 0x00, 0x00, 0x00]), 32);
    }

    #[test]
    fn leading_zeros_of_empty_is_zero() {
        assert_eq!(leading_zero_bits(&[]), 0);
    }
}
