//! Immutable parameters governing a single PoW instance.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Parameters governing a single PoW instance.
///
/// All fields are plain values, so `Config` is `Copy` and cheap to pass
/// around by value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Elements per chunk (`l`).
    pub chunk_size: usize,
    /// Chunks in memory (`P`).
    pub chunk_count: usize,
    /// Predecessors compressed per non-seed element (`n`).
    pub antecedent_count: usize,
    /// Required leading zero bits of the final omega digest (`d`).
    pub difficulty_bits: u32,
    /// Steps in the nonce-driven walk (`L`).
    pub search_length: usize,
}

impl Config {
    /// Build a `Config`, validating it eagerly so construction failures
    /// surface at the call site rather than deep inside the memory builder.
    pub fn new(
        chunk_size: usize,
        chunk_count: usize,
        antecedent_count: usize,
        difficulty_bits: u32,
        search_length: usize,
    ) -> Result<Self> {
        let cfg = Self {
            chunk_size,
            chunk_count,
            antecedent_count,
            difficulty_bits,
            search_length,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Total element count `T = P * l`. Saturates at `usize::MAX` instead
    /// of overflowing, since `Config` may arrive over the wire from an
    /// untrusted proof and this must never panic.
    #[must_use]
    pub const fn total_elements(&self) -> usize {
        self.chunk_count.saturating_mul(self.chunk_size)
    }

    /// Total Merkle tree node count `2T - 1`.
    #[must_use]
    pub const fn tree_node_count(&self) -> usize {
        2usize.saturating_mul(self.total_elements()).saturating_sub(1)
    }

    /// Check the data-model invariants: `n >= 1`, `n <= l`, `L >= 1`,
    /// and `T = P*l >= 2`, plus the arithmetic well-formedness a
    /// deserialized (and possibly adversarial) `Config` is not otherwise
    /// guaranteed to have.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.antecedent_count >= 1, "antecedent_count must be >= 1");
        ensure!(
            self.antecedent_count <= self.chunk_size,
            "antecedent_count must be <= chunk_size"
        );
        ensure!(self.search_length >= 1, "search_length must be >= 1");
        ensure!(self.chunk_size > 0, "chunk_size must be > 0");
        ensure!(self.chunk_count > 0, "chunk_count must be > 0");
        ensure!(
            self.chunk_count.checked_mul(self.chunk_size).is_some(),
            "chunk_count * chunk_size overflows usize"
        );
        ensure!(
            self.total_elements() >= 2,
            "total element count T = chunk_count * chunk_size must be >= 2"
        );
        Ok(())
    }
}

impl Default for Config {
    /// Defaults: `l = 2^15`, `P = 2^10`, `n = 4`, `d = 24`, `L = 9`.
    fn default() -> Self {
        Self {
            chunk_size: 1 << 15,
            chunk_count: 1 << 10,
            antecedent_count: 4,
            difficulty_bits: 24,
            search_length: 9,
        }
    }
}
