//! The proof bundle.

use std::collections::BTreeMap;

use itsuku_core::{ChallengeId, Config, Element};
use itsuku_merkle::MerkleOpening;
use serde::{Deserialize, Serialize};

/// A winning nonce plus the disclosed antecedents and Merkle opening
/// needed to replay and verify the walk without access to full memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proof {
    /// The `Config` this proof was produced under.
    pub config: Config,
    /// The challenge this proof was produced for.
    pub challenge_id: ChallengeId,
    /// The winning nonce.
    pub nonce: u64,
    /// For each of the `L` visited leaves, the antecedent elements needed
    /// to recompute it (a singleton for seed elements).
    pub leaf_antecedents: BTreeMap<u64, Vec<Element>>,
    /// The minimal set of Merkle nodes needed to re-derive the root from
    /// the disclosed leaves.
    pub tree_opening: MerkleOpening,
}

impl Proof {
    /// Number of distinct leaves disclosed in this proof.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaf_antecedents.len()
    }
}
