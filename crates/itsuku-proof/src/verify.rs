//! Proof verification. Re-executes the memory
//! compression only for disclosed leaves, re-derives Merkle leaf hashes
//! and the root from the opening, replays the walk, and checks the
//! leading-zero count -- without ever seeing full memory.

use std::collections::BTreeMap;

use itsuku_core::{compress, Element};
use itsuku_crypto::{digest64, leading_zero_bits};
use itsuku_merkle::{merkle_node_width, MerkleAscendError, MerkleTree};

use crate::proof::Proof;
use crate::walk::run_walk;

/// The disjoint verification outcomes this crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// A `leaf_antecedents` entry has the wrong list length for its
    /// position class (seed vs. compressed).
    #[error("leaf_antecedents entry has the wrong length for its position class")]
    InvalidAntecedentCount,
    /// No entry in `tree_opening` for a required leaf node index.
    #[error("tree_opening is missing the entry for a required leaf node")]
    MissingOpeningForLeaf,
    /// The recomputed leaf hash differs from the disclosed one.
    #[error("recomputed leaf hash does not match the disclosed opening")]
    LeafHashMismatch,
    /// An internal node recomputed during ascent differs from the
    /// disclosed one.
    #[error("recomputed intermediate hash does not match the disclosed opening")]
    IntermediateHashMismatch,
    /// A sibling or child required to ascend is absent.
    #[error("a sibling or child node required to ascend the tree is absent")]
    MissingChildNode,
    /// Node index 0 is absent from `tree_opening`.
    #[error("tree_opening is missing the root (node index 0)")]
    MissingMerkleRoot,
    /// The replayed walk selects an index that is not a key of
    /// `leaf_antecedents`.
    #[error("the replayed walk visits a leaf absent from leaf_antecedents")]
    UnprovenLeafInPath,
    /// `leading_zero_bits(omega) < difficulty_bits`.
    #[error("omega does not meet the required number of leading zero bits")]
    DifficultyNotMet,
    /// A required internal allocation failed during verification.
    #[error("a required internal allocation failed during verification")]
    RequiredElementMissing,
}

impl From<MerkleAscendError> for VerificationError {
    fn from(err: MerkleAscendError) -> Self {
        match err {
            MerkleAscendError::MissingChild(_) | MerkleAscendError::WrongNodeWidth(_) => {
                Self::MissingChildNode
            }
            MerkleAscendError::IntermediateMismatch(_) => Self::IntermediateHashMismatch,
            MerkleAscendError::MissingRoot => Self::MissingMerkleRoot,
        }
    }
}

/// Verify a [`Proof`] against its own embedded `Config` and `ChallengeId`
/// Returns `Ok(())` iff all four stages pass.
pub fn proof_verify(proof: &Proof) -> Result<(), VerificationError> {
    let config = &proof.config;
    // A proof is untrusted input: its embedded `Config` may not satisfy
    // the data-model invariants (e.g. chunk_size = 0, which would panic on
    // the modulo below). Reject it rather than let arithmetic panic.
    if config.validate().is_err() {
        return Err(VerificationError::RequiredElementMissing);
    }
    let challenge_id = &proof.challenge_id;
    let l = config.chunk_size;
    let n = config.antecedent_count;
    let t = config.total_elements();
    let node_width = merkle_node_width(config);
    if node_width > itsuku_crypto::DIGEST_LEN {
        // A proof is untrusted input; an adversarial config could demand a
        // node width wider than any digest this primitive can produce.
        return Err(VerificationError::RequiredElementMissing);
    }

    // Stage 1 -- reconstruct elements.
    let mut reconstructed: BTreeMap<u64, Element> = BTreeMap::new();
    for (&leaf_index, antecedents) in &proof.leaf_antecedents {
        let m = (leaf_index as usize) % l;
        let element = if m < n {
            if antecedents.len() != 1 {
                return Err(VerificationError::InvalidAntecedentCount);
            }
            antecedents[0]
        } else {
            if antecedents.len() != n {
                return Err(VerificationError::InvalidAntecedentCount);
            }
            compress(antecedents, leaf_index, challenge_id)
        };
        reconstructed.insert(leaf_index, element);
    }

    // Stage 2 -- verify leaf hashes.
    let mut leaf_hashes: Vec<(u64, Vec<u8>)> = Vec::with_capacity(reconstructed.len());
    for (&leaf_index, element) in &reconstructed {
        let digest = digest64(&[&element.to_le_bytes(), challenge_id.as_bytes()]);
        let leaf_hash = digest[..node_width].to_vec();
        // `leaf_index` is untrusted (a key from the proof); wrap rather
        // than panic on overflow -- an out-of-range result simply won't
        // match a real node index and falls through to
        // `MissingOpeningForLeaf`.
        let node_index = (t as u64).wrapping_sub(1).wrapping_add(leaf_index);
        let disclosed = proof
            .tree_opening
            .get(&node_index)
            .ok_or(VerificationError::MissingOpeningForLeaf)?;
        if disclosed.as_slice() != leaf_hash.as_slice() {
            return Err(VerificationError::LeafHashMismatch);
        }
        leaf_hashes.push((node_index, leaf_hash));
    }

    // Stage 3 -- ascend the tree, confirming every intermediate hash.
    if !proof.tree_opening.contains_key(&0) {
        return Err(VerificationError::MissingMerkleRoot);
    }
    let root = MerkleTree::ascend(
        node_width,
        t,
        leaf_hashes,
        &proof.tree_opening,
        challenge_id,
    )?;

    // Stage 4 -- replay the walk using the reconstructed elements as the
    // only available memory oracle.
    let outcome = run_walk(config, challenge_id, &root, proof.nonce, |idx| {
        reconstructed.get(&(idx as u64)).copied()
    })
    .ok_or(VerificationError::UnprovenLeafInPath)?;

    if leading_zero_bits(&outcome.omega) < config.difficulty_bits {
        return Err(VerificationError::DifficultyNotMet);
    }

    Ok(())
}
