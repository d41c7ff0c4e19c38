//! The 64-byte memory word, viewed equivalently as a byte
//! string (little-endian) or as eight 64-bit lanes.

use serde::{Deserialize, Serialize};

/// A 64-byte datum interpreted equivalently as either a little-endian byte
/// string or as [`Element::LANES`] 64-bit lanes.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    lanes: [u64; Element::LANES],
}

impl Element {
    /// Number of 64-bit lanes per element.
    pub const LANES: usize = 8;
    /// Width of an element in bytes.
    pub const BYTES: usize = Self::LANES * 8;

    /// The all-zero element.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            lanes: [0u64; Self::LANES],
        }
    }

    /// Reinterpret a 64-byte little-endian buffer as an `Element`.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; Self::BYTES]) -> Self {
        let mut lanes = [0u64; Self::LANES];
        for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *lane = u64::from_le_bytes(word);
        }
        Self { lanes }
    }

    /// Serialize to a 64-byte little-endian buffer.
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; Self::BYTES] {
        let mut out = [0u8; Self::BYTES];
        for (lane, chunk) in self.lanes.iter().zip(out.chunks_exact_mut(8)) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        out
    }

    /// The first four bytes of the little-endian view, used to seed
    /// `argon2_index`.
    #[must_use]
    pub fn first_four_le_bytes(self) -> [u8; 4] {
        let lo = self.lanes[0].to_le_bytes();
        [lo[0], lo[1], lo[2], lo[3]]
    }

    /// Lane-wise wrapping addition, in place.
    pub fn wrapping_add_assign(&mut self, other: &Self) {
        for (a, b) in self.lanes.iter_mut().zip(other.lanes.iter()) {
            *a = a.wrapping_add(*b);
        }
    }

    /// Lane-wise XOR, in place. Part of `Element`'s required operation set
    /// (zero, wrapping add, XOR, XOR-with-bytes, byte conversion) alongside
    /// [`Self::wrapping_add_assign`]; kept on the public surface for API
    /// completeness even though the compression and walk code paths in
    /// this crate only ever exercise the other four.
    pub fn xor_assign(&mut self, other: &Self) {
        for (a, b) in self.lanes.iter_mut().zip(other.lanes.iter()) {
            *a ^= *b;
        }
    }

    /// XOR a raw 64-bit value into lane 0, used to mix the global position
    /// `g` into the `even` accumulator during compression.
    pub fn xor_lane0(&mut self, value: u64) {
        self.lanes[0] ^= value;
    }

    /// XOR `bytes` into this element's little-endian byte view, byte for
    /// byte, for the first `min(bytes.len(), 64)` positions. The remaining
    /// bytes of the element are left untouched.
    pub fn xor_assign_bytes(&mut self, bytes: &[u8]) {
        let mut buf = self.to_le_bytes();
        let n = bytes.len().min(buf.len());
        for (dst, src) in buf.iter_mut().zip(bytes.iter()).take(n) {
            *dst ^= *src;
        }
        *self = Self::from_le_bytes(&buf);
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_le_bytes();
        write!(f, "Element(")?;
        for b in &bytes[..4] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "...)")
    }
}

#[cfg(test)]
mod tests {
    use super::Element;

    #[test]
    fn round_trips_through_bytes() {
        let mut bytes = [0u8; 64];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let e = Element::from_le_bytes(&bytes);
        assert_eq!(e.to_le_bytes(), bytes);
    }

    #[test]
    fn wrapping_add_wraps_per_lane() {
        let mut a = Element::from_le_bytes(&[0xff; 64]);
        let one = {
            let mut bytes = [0u8; 64];
            bytes[0] = 1;
            Element::from_le_bytes(&bytes)
        };
        a.wrapping_add_assign(&one);
        let out = a.to_le_bytes();
        assert_eq!(out[0..8], [0u8; 8]);
    }

    #[test]
    fn xor_assign_bytes_only_touches_prefix() {
        let mut e = Element::zero();
        e.xor_assign_bytes(&[0xff, 0xff]);
        let out = e.to_le_bytes();
        assert_eq!(out[0], 0xff);
        assert_eq!(out[1], 0xff);
        assert_eq!(out[2], 0x00);
    }

    #[test]
    fn first_four_le_bytes_matches_lane0_prefix() {
        let mut bytes = [0u8; 64];
        bytes[0..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        let e = Element::from_le_bytes(&bytes);
        assert_eq!(e.first_four_le_bytes(), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn xor_assign_is_lane_wise_and_self_inverse() {
        let mut bytes_a = [0u8; 64];
        let mut bytes_b = [0u8; 64];
        for (i, (a, b)) in bytes_a.iter_mut().zip(bytes_b.iter_mut()).enumerate() {
            *a = i as u8;
            *b = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        let a = Element::from_le_bytes(&bytes_a);
        let b = Element::from_le_bytes(&bytes_b);

        let mut xored = a;
        xored.xor_assign(&b);
        assert_ne!(xored.to_le_bytes(), a.to_le_bytes());

        xored.xor_assign(&b);
        assert_eq!(xored.to_le_bytes(), a.to_le_bytes(), "XOR with the same value twice is the identity");
    }
}
