//! Proof search: a monotonically increasing nonce scan
//! for an `L`-step walk whose final omega digest has enough leading zero
//! bits.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use itsuku_core::{ChallengeId, Config, Memory};
use itsuku_crypto::leading_zero_bits;
use itsuku_merkle::MerkleTree;
use tracing::{debug, info};

use crate::proof::Proof;
use crate::walk::run_walk;

fn assemble_proof(
    config: &Config,
    challenge_id: &ChallengeId,
    memory: &Memory,
    tree: &MerkleTree,
    nonce: u64,
    visited: &[usize],
) -> Proof {
    let mut leaf_antecedents = BTreeMap::new();
    let mut tree_opening = itsuku_merkle::MerkleOpening::new();
    for &idx in visited {
        leaf_antecedents
            .entry(idx as u64)
            .or_insert_with(|| memory.trace_element(idx));
        let node_index = tree.leaf_index(idx) as u64;
        tree.trace_node(node_index, &mut tree_opening);
    }
    Proof {
        config: *config,
        challenge_id: challenge_id.clone(),
        nonce,
        leaf_antecedents,
        tree_opening,
    }
}

/// Try nonce `nonce` against a fully built memory and tree; returns the
/// proof if it clears `config.difficulty_bits`.
fn try_nonce(
    config: &Config,
    challenge_id: &ChallengeId,
    memory: &Memory,
    tree: &MerkleTree,
    nonce: u64,
) -> Option<Proof> {
    let root = tree.node(0);
    let outcome = run_walk(config, challenge_id, root, nonce, |idx| Some(memory.get(idx)))
        .expect("memory lookups never fail during search");
    if leading_zero_bits(&outcome.omega) < config.difficulty_bits {
        return None;
    }
    Some(assemble_proof(
        config,
        challenge_id,
        memory,
        tree,
        nonce,
        &outcome.visited,
    ))
}

/// Sequential reference search: scan nonces `1, 2, 3, ...`
/// until one satisfies the difficulty, or until `cancel` is observed set.
///
/// Returns `None` if cancelled before a winner is found; the nonce domain
/// is large enough in practice that exhaustion is not a realistic outcome.
pub fn proof_search(
    config: &Config,
    challenge_id: &ChallengeId,
    memory: &Memory,
    tree: &MerkleTree,
    cancel: Option<&AtomicBool>,
) -> Option<Proof> {
    info!(difficulty_bits = config.difficulty_bits, "starting proof search");
    for nonce in 1..=u64::MAX {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                debug!(nonce, "search cancelled");
                return None;
            }
        }
        if let Some(proof) = try_nonce(config, challenge_id, memory, tree, nonce) {
            info!(nonce, "found winning nonce");
            return Some(proof);
        }
    }
    None
}

/// Parallel search partitioning the nonce domain across `threads` OS
/// threads.
///
/// Thread `t` (zero-based) scans the residue class
/// `nonce ≡ (t + 1) (mod threads)`, starting at `t + 1` and stepping by
/// `threads`. The first thread to find a satisfying nonce publishes a
/// fully assembled [`Proof`] through a channel and sets a shared
/// `AtomicBool` that every other thread checks between attempts; no
/// partial proof is ever published.
pub fn proof_search_parallel(
    config: &Config,
    challenge_id: &ChallengeId,
    memory: &Memory,
    tree: &MerkleTree,
    threads: usize,
) -> Option<Proof> {
    let threads = threads.max(1);
    if threads == 1 {
        return proof_search(config, challenge_id, memory, tree, None);
    }

    let found = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Proof>();

    info!(threads, "starting parallel proof search");
    std::thread::scope(|scope| {
        for t in 0..threads {
            let tx = tx.clone();
            let found = &found;
            scope.spawn(move || {
                let mut nonce = (t as u64) + 1;
                loop {
                    if found.load(Ordering::Relaxed) {
                        return;
                    }
                    if let Some(proof) = try_nonce(config, challenge_id, memory, tree, nonce) {
                        if !found.swap(true, Ordering::AcqRel) {
                            let _ = tx.send(proof);
                        }
                        return;
                    }
                    nonce = match nonce.checked_add(threads as u64) {
                        Some(next) => next,
                        None => return,
                    };
                }
            });
        }
        drop(tx);
    });

    rx.into_iter().next()
}
