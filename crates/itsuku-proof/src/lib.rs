//! Nonce search, proof assembly, and verification for the Itsuku
//! memory-hard proof-of-work.
//!
//! Consumes `itsuku-core`'s `Memory` and `itsuku-merkle`'s `MerkleTree` to
//! produce a compact [`Proof`] and to check one without ever touching full
//! memory.

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

mod proof;
mod search;
mod verify;
mod walk;

pub mod io;

pub use proof::Proof;
pub use search::{proof_search, proof_search_parallel};
pub use verify::{proof_verify, VerificationError};

#[cfg(test)]
mod tests {
    use super::*;
    use itsuku_core::{ChallengeId, Config, Memory};
    use itsuku_merkle::MerkleTree;

    fn small_scenario() -> (Config, ChallengeId, Memory, MerkleTree) {
        // Same small config as the memory reference vector tests,
        // with difficulty_bits = 8.
        let config = Config::new(8, 2, 4, 8, 9).expect("valid config");
        let challenge = ChallengeId::new((0u8..=63).collect::<Vec<u8>>());
        let mut memory = Memory::new(config).expect("alloc");
        memory.build_all(&challenge);
        let mut tree = MerkleTree::new(config).expect("alloc");
        tree.compute_leaves(&challenge, &memory);
        tree.compute_intermediates(&challenge);
        (config, challenge, memory, tree)
    }

    #[test]
    fn search_then_verify_round_trip() {
        let (config, challenge, memory, tree) = small_scenario();
        let proof =
            proof_search(&config, &challenge, &memory, &tree, None).expect("a proof is found");
        assert!(proof.nonce >= 1);
        assert!(proof.leaf_count() <= config.search_length);
        assert!(proof.tree_opening.contains_key(&0));
        assert!(proof.tree_opening.len() >= proof.leaf_count() + 1);
        assert_eq!(proof_verify(&proof), Ok(()));
    }

    #[test]
    fn search_is_deterministic() {
        let (config, challenge, memory, tree) = small_scenario();
        let p1 = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        let p2 = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        assert_eq!(p1.nonce, p2.nonce);
    }

    #[test]
    fn tampering_nonce_breaks_verification() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        proof.nonce ^= 1;
        assert!(proof_verify(&proof).is_err());
    }

    #[test]
    fn tampering_an_antecedent_breaks_verification() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        let key = *proof.leaf_antecedents.keys().next().expect("at least one leaf");
        let elements = proof.leaf_antecedents.get_mut(&key).expect("entry present");
        let mut bytes = elements[0].to_le_bytes();
        bytes[0] ^= 1;
        elements[0] = itsuku_core::Element::from_le_bytes(&bytes);
        assert!(proof_verify(&proof).is_err());
    }

    #[test]
    fn tampering_an_opening_node_breaks_verification() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        let key = *proof
            .tree_opening
            .keys()
            .find(|&&k| k != 0)
            .expect("at least one non-root node");
        proof.tree_opening.get_mut(&key).expect("entry present")[0] ^= 1;
        assert!(proof_verify(&proof).is_err());
    }

    #[test]
    fn tampering_config_difficulty_breaks_verification() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        proof.config.difficulty_bits += 1;
        assert!(proof_verify(&proof).is_err());
    }

    #[test]
    fn missing_root_is_rejected() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        proof.tree_opening.remove(&0);
        assert_eq!(
            proof_verify(&proof),
            Err(VerificationError::MissingMerkleRoot)
        );
    }

    #[test]
    fn dropping_a_leaf_antecedent_entry_is_rejected() {
        let (config, challenge, memory, tree) = small_scenario();
        let mut proof = proof_search(&config, &challenge, &memory, &tree, None).expect("found");
        let key = *proof.leaf_antecedents.keys().next().expect("at least one leaf");
        proof.leaf_antecedents.remove(&key);
        assert!(proof_verify(&proof).is_err());
    }

    #[test]
    fn parallel_search_finds_a_valid_proof() {
        let (config, challenge, memory, tree) = small_scenario();
        let proof = search::proof_search_parallel(&config, &challenge, &memory, &tree, 4)
            .expect("a proof is found");
        assert_eq!(proof_verify(&proof), Ok(()));
    }
}
