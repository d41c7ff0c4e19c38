//! Truncated-width Merkle commitment over Itsuku PoW memory.
//!
//! Every node -- leaf or intermediate -- shares the same truncated width
//! `M`, sized just wide enough that collision probability across the
//! nonce-driven walk stays negligible given the configured difficulty and
//! search length. The tree is a flat, complete binary tree over `T`
//! leaves stored as one contiguous byte buffer rather than a tree of
//! separately allocated nodes.

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

use std::collections::BTreeMap;

use anyhow::{ensure, Context, Result};
use itsuku_core::{ChallengeId, Config, Memory};
use itsuku_crypto::{digest64, truncate};
use rayon::prelude::*;
use tracing::debug;

/// The minimal set of Merkle nodes disclosed to let a verifier re-derive
/// the root from selected leaves: a sparse map from node index to its
/// `M`-byte hash. A `BTreeMap` is the natural Rust realization of
/// this sparse, order-independent keyed container, and both
/// `serde_json` and `ciborium` serialize it directly.
pub type MerkleOpening = BTreeMap<u64, Vec<u8>>;

/// Node width `M`, in bytes, for the given config:
///
/// ```text
/// M = ceil((d + log2(1 + c_x*L + ceil(L/2)) + 6) / 8)
/// ```
///
/// with memory-cost constant `c_x = 1.0`.
#[must_use]
pub fn merkle_node_width(config: &Config) -> usize {
    const C_X: f64 = 1.0;
    let l = config.search_length as f64;
    let ceil_half = ((config.search_length + 1) / 2) as f64;
    let inner = 1.0 + C_X * l + ceil_half;
    let bits = f64::from(config.difficulty_bits) + inner.log2() + 6.0;
    (bits / 8.0).ceil() as usize
}

/// A flat, complete binary tree of `2T - 1` nodes, each `node_width(config)`
/// bytes wide. Node index 0 is the root; children of `k` are `2k+1` and
/// `2k+2`; leaves occupy indices `T-1 ..= 2T-2`, one per memory element.
#[derive(Debug)]
pub struct MerkleTree {
    config: Config,
    node_width: usize,
    nodes: Vec<u8>,
}

impl MerkleTree {
    /// Allocate an empty tree of `2T - 1` zeroed `node_width`-byte nodes.
    /// Fails only if allocation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate().context("invalid config")?;
        let node_width = merkle_node_width(&config);
        ensure!(
            node_width <= itsuku_crypto::DIGEST_LEN,
            "merkle node width {node_width} exceeds the {}-byte digest width; lower difficulty_bits or search_length",
            itsuku_crypto::DIGEST_LEN
        );
        let node_count = config.tree_node_count();
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(node_count * node_width)
            .context("allocating merkle node buffer")?;
        nodes.resize(node_count * node_width, 0u8);
        Ok(Self {
            config,
            node_width,
            nodes,
        })
    }

    /// Width, in bytes, of every node in this tree.
    #[must_use]
    pub const fn node_width(&self) -> usize {
        self.node_width
    }

    /// Total element count `T` this tree was sized for.
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.config.total_elements()
    }

    /// Borrow node `index`'s `node_width`-byte hash.
    #[must_use]
    pub fn node(&self, index: usize) -> &[u8] {
        let start = index * self.node_width;
        &self.nodes[start..start + self.node_width]
    }

    fn set_node(&mut self, index: usize, value: &[u8]) {
        let start = index * self.node_width;
        self.nodes[start..start + self.node_width].copy_from_slice(value);
    }

    /// Leaf node index for memory element `i`.
    #[must_use]
    pub const fn leaf_index(&self, i: usize) -> usize {
        self.leaf_count() - 1 + i
    }

    /// Write leaf hashes `H(le-bytes(X[i]) || I)` truncated to `M` bytes,
    /// for every `i in [0, T)`.
    pub fn compute_leaves(&mut self, challenge_id: &ChallengeId, memory: &Memory) {
        let t = self.leaf_count();
        let node_width = self.node_width;
        debug!(t, node_width, "hashing merkle leaves");

        let leaf_start = t - 1;
        let hashes: Vec<Vec<u8>> = (0..t)
            .into_par_iter()
            .map(|i| {
                let bytes = memory.get(i).to_le_bytes();
                let digest = digest64(&[&bytes, challenge_id.as_bytes()]);
                truncate(&digest, node_width)
            })
            .collect();
        for (i, hash) in hashes.into_iter().enumerate() {
            self.set_node(leaf_start + i, &hash);
        }
    }

    /// Write intermediate node hashes `H(left || right || I)` truncated to
    /// `M` bytes, descending from `T - 2` to `0`. Must be called after
    /// [`Self::compute_leaves`].
    pub fn compute_intermediates(&mut self, challenge_id: &ChallengeId) {
        let t = self.leaf_count();
        if t < 1 {
            return;
        }
        let node_width = self.node_width;
        let mut p = t.saturating_sub(2);
        loop {
            let left = self.node(2 * p + 1).to_vec();
            let right = self.node(2 * p + 2).to_vec();
            let digest = digest64(&[&left, &right, challenge_id.as_bytes()]);
            self.set_node(p, &truncate(&digest, node_width));
            if p == 0 {
                break;
            }
            p -= 1;
        }
    }

    /// Insert node `v`, its sibling, and every ancestor's sibling up to and
    /// including the root into `opening`.
    ///
    /// For even `v > 0` the sibling is `v - 1`; for odd `v` the sibling is
    /// `v + 1`. Recursion (here, iteration) terminates at the root, index
    /// 0, which is always inserted.
    pub fn trace_node(&self, node_index: u64, opening: &mut MerkleOpening) {
        let mut v = node_index;
        loop {
            opening
                .entry(v)
                .or_insert_with(|| self.node(v as usize).to_vec());
            if v == 0 {
                break;
            }
            let sibling = if v % 2 == 0 { v - 1 } else { v + 1 };
            opening
                .entry(sibling)
                .or_insert_with(|| self.node(sibling as usize).to_vec());
            v = (v - 1) / 2;
        }
    }

    /// Recompute the root hash implied by an opening, ascending from a set
    /// of already-verified leaf nodes. Returns the root bytes, or an error
    /// naming the first structural problem encountered. Shared by
    /// `itsuku-proof`'s verifier.
    pub fn ascend(
        node_width: usize,
        leaf_count: usize,
        leaves: impl IntoIterator<Item = (u64, Vec<u8>)>,
        opening: &MerkleOpening,
        challenge_id: &ChallengeId,
    ) -> Result<Vec<u8>, MerkleAscendError> {
        ensure_node_width(node_width, opening)?;
        let mut known: BTreeMap<u64, Vec<u8>> = BTreeMap::new();
        for (idx, hash) in leaves {
            known.insert(idx, hash);
        }
        if leaf_count == 0 {
            return Err(MerkleAscendError::MissingRoot);
        }
        let mut frontier: Vec<u64> = known.keys().copied().collect();
        frontier.sort_unstable();
        frontier.dedup();

        let mut visited = known.clone();
        for &start in &frontier {
            let mut v = start;
            loop {
                if v == 0 {
                    break;
                }
                let sibling = if v % 2 == 0 { v - 1 } else { v + 1 };
                let sibling_hash = opening
                    .get(&sibling)
                    .ok_or(MerkleAscendError::MissingChild(sibling))?;
                let parent = (v - 1) / 2;
                let (left_idx, right_idx) = if v % 2 == 1 { (v, sibling) } else { (sibling, v) };
                let left = visited
                    .get(&left_idx)
                    .cloned()
                    .or_else(|| opening.get(&left_idx).cloned())
                    .ok_or(MerkleAscendError::MissingChild(left_idx))?;
                let right = if right_idx == sibling {
                    sibling_hash.clone()
                } else {
                    visited
                        .get(&right_idx)
                        .cloned()
                        .or_else(|| opening.get(&right_idx).cloned())
                        .ok_or(MerkleAscendError::MissingChild(right_idx))?
                };
                let digest = digest64(&[&left, &right, challenge_id.as_bytes()]);
                let computed = truncate(&digest, node_width);
                if let Some(disclosed) = opening.get(&parent) {
                    if disclosed.as_slice() != computed.as_slice() {
                        return Err(MerkleAscendError::IntermediateMismatch(parent));
                    }
                }
                visited.insert(parent, computed);
                v = parent;
            }
        }
        visited
            .get(&0)
            .cloned()
            .ok_or(MerkleAscendError::MissingRoot)
    }
}

fn ensure_node_width(node_width: usize, opening: &MerkleOpening) -> Result<(), MerkleAscendError> {
    for (idx, hash) in opening {
        if hash.len() != node_width {
            return Err(MerkleAscendError::WrongNodeWidth(*idx));
        }
    }
    Ok(())
}

/// Structural problems that can occur while ascending an opening back to
/// the root. `itsuku-proof` maps these onto its public `VerificationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MerkleAscendError {
    /// A sibling or child node required to ascend is absent.
    #[error("missing child node at index {0}")]
    MissingChild(u64),
    /// An internal node recomputed during ascent differs from the
    /// disclosed one.
    #[error("intermediate hash mismatch at index {0}")]
    IntermediateMismatch(u64),
    /// Node index 0 is absent from the opening.
    #[error("opening is missing the root (node index 0)")]
    MissingRoot,
    /// An opening entry has the wrong byte width for this tree.
    #[error("opening entry at index {0} has the wrong node width")]
    WrongNodeWidth(u64),
}
