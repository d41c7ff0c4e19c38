//! The opaque challenge identifier `I`.

use serde::{Deserialize, Serialize};

/// An owned byte sequence of arbitrary length, treated as opaque input to
/// every keyed hash in the PoW. Typically 64 bytes, but the protocol places
/// no constraint on its length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeId(Vec<u8>);

impl ChallengeId {
    /// Copy `bytes` into a new `ChallengeId`.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the challenge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the challenge is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ChallengeId {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::ChallengeId;

    #[test]
    fn copies_bytes_verbatim() {
        let id = ChallengeId::new(vec![1, 2, 3]);
        assert_eq!(id.as_bytes(), &[1, 2, 3]);
        assert_eq!(id.len(), 3);
        assert!(!id.is_empty());
    }
}
