//! Indexing primitives: pure functions mapping a previous-element seed and
//! an in-chunk position to an antecedent index.
//!
//! Both functions are allocation-free and perform all arithmetic with
//! explicit wrapping semantics; every addition, subtraction, and product
//! here is modulo 2^64.

/// Derive a 64-bit seed `φ` from the first four bytes of the previous
/// element (`seed4`, little-endian) and the current in-chunk position `i`.
///
/// Mirrors Argon2's index-selection recurrence:
/// ```text
/// x = (s * s) >> 32
/// y = (i * x) >> 32
/// z = (i - 1) - y
/// ```
#[must_use]
pub fn argon2_index(seed4: [u8; 4], i: u64) -> u64 {
    let s = u64::from(u32::from_le_bytes(seed4));
    let x = s.wrapping_mul(s) >> 32;
    let y = i.wrapping_mul(x) >> 32;
    i.wrapping_sub(1).wrapping_sub(y)
}

/// Select an antecedent index in `[0, i)` given the current position `i`,
/// the `φ` seed from [`argon2_index`], and a variant selector `k`.
///
/// `k mod 12` picks one of twelve expressions; the raw result is then
/// reduced modulo `i` so the output always lies in `[0, i)`. Only the
/// final `mod i` is applied here -- a secondary `index - 1` safety clamp
/// some Argon2 variants add afterward is unreachable once the mod is
/// correct, and is intentionally not reproduced.
#[must_use]
pub fn phi_variant(i: u64, phi: u64, k: u64) -> u64 {
    if i == 0 {
        return 0;
    }
    let raw = match k % 12 {
        0 => i.wrapping_sub(1),
        1 => phi,
        2 => phi.wrapping_add(i) / 2,
        3 => 7u64.wrapping_mul(i) / 8,
        4 => phi.wrapping_add(3u64.wrapping_mul(i)) / 4,
        5 => phi.wrapping_add(5u64.wrapping_mul(i)) / 8,
        6 => 3u64.wrapping_mul(i) / 4,
        7 => i / 2,
        8 => i / 4,
        9 => 0,
        10 => 7u64.wrapping_mul(phi) / 8,
        11 => 7u64.wrapping_mul(i) / 8,
        _ => unreachable!("k % 12 is always in [0, 12)"),
    };
    raw % i
}

#[cfg(test)]
mod tests {
    use super::{argon2_index, phi_variant};
    use proptest::prelude::*;

    #[test]
    fn argon2_index_concrete_vector() {
        assert_eq!(argon2_index([0x01, 0, 0, 0], 1000), 999);
    }

    #[test]
    fn phi_variant_concrete_vectors() {
        let cases: &[(u64, u64)] = &[(0, 1023), (2, 562), (3, 896), (11, 896), (10, 87)];
        for &(k, expected) in cases {
            assert_eq!(phi_variant(1024, 100, k), expected, "k = {k}");
        }
    }

    #[test]
    fn phi_variant_of_zero_is_zero() {
        for k in 0..12 {
            assert_eq!(phi_variant(0, 100, k), 0);
        }
    }

    proptest! {
        #[test]
        fn phi_variant_always_in_range(i in 1u64..1_000_000, phi in any::<u64>(), k in any::<u64>()) {
            let out = phi_variant(i, phi, k);
            prop_assert!(out < i);
        }

        #[test]
        fn argon2_index_never_panics(seed in any::<[u8; 4]>(), i in any::<u64>()) {
            let _ = argon2_index(seed, i);
        }
    }
}
