//! The memory builder: a two-dimensional array of
//! fixed-width elements, filled chunk by chunk through a per-chunk
//! recurrence whose first `n` elements are hash-seeded and whose remaining
//! elements compress `n` in-chunk antecedents.

use crate::challenge::ChallengeId;
use crate::element::Element;
use crate::index::{argon2_index, phi_variant};
use crate::config::Config;
use anyhow::{Context, Result};
use itsuku_crypto::digest64;
use rayon::prelude::*;
use tracing::debug;

/// The compression function `Φ`.
///
/// Splits `antecedents` by parity, wrapping-adds each half lane-wise, XORs
/// the global position `g` into the even accumulator's lane 0 and the
/// challenge bytes into the odd accumulator's byte view, then hashes the
/// two 64-byte accumulators together. Used identically by the memory
/// builder (full antecedents) and by verification (disclosed antecedents),
/// which is why it is a free function rather than a `Memory` method.
#[must_use]
pub fn compress(antecedents: &[Element], g: u64, challenge: &ChallengeId) -> Element {
    let mut even = Element::zero();
    let mut odd = Element::zero();
    for (k, a) in antecedents.iter().enumerate() {
        if k % 2 == 0 {
            even.wrapping_add_assign(a);
        } else {
            odd.wrapping_add_assign(a);
        }
    }
    even.xor_lane0(g);
    odd.xor_assign_bytes(challenge.as_bytes());

    let even_bytes = even.to_le_bytes();
    let odd_bytes = odd.to_le_bytes();
    let digest = digest64(&[&even_bytes, &odd_bytes]);
    Element::from_le_bytes(&digest)
}

/// Compute the `n` in-chunk antecedent offsets for position `m` within a
/// chunk, using only elements already written at offsets `< m`.
fn antecedent_offsets(config: &Config, chunk: &[Element], m: usize) -> Vec<usize> {
    let seed4 = chunk[m - 1].first_four_le_bytes();
    let phi = argon2_index(seed4, m as u64);
    (0..config.antecedent_count)
        .map(|k| (phi_variant(m as u64, phi, k as u64) as usize) % config.chunk_size)
        .collect()
}

/// The data-dependent memory array `X`, organized as `chunk_count` chunks
/// of `chunk_size` elements each.
#[derive(Debug)]
pub struct Memory {
    config: Config,
    chunks: Vec<Vec<Element>>,
}

impl Memory {
    /// Allocate `T = chunk_count * chunk_size` zeroed elements, organized
    /// as `chunk_count` chunks. Fails only if allocation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate().context("invalid config")?;
        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(config.chunk_count)
            .context("allocating chunk table")?;
        for _ in 0..config.chunk_count {
            let mut chunk = Vec::new();
            chunk
                .try_reserve_exact(config.chunk_size)
                .context("allocating a memory chunk")?;
            chunk.resize(config.chunk_size, Element::zero());
            chunks.push(chunk);
        }
        Ok(Self { config, chunks })
    }

    /// The `Config` this memory was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Total element count `T`.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.config.total_elements()
    }

    /// Populate every chunk via the seed and compression phases.
    /// Chunks are independent and are filled in parallel
    /// with `rayon`; within a chunk the recurrence is strictly sequential.
    pub fn build_all(&mut self, challenge_id: &ChallengeId) {
        let l = self.config.chunk_size;
        let n = self.config.antecedent_count;
        debug!(chunks = self.chunks.len(), l, n, "building memory");

        self.chunks
            .par_iter_mut()
            .enumerate()
            .for_each(|(c, chunk)| {
                for m in 0..n {
                    let digest = digest64(&[
                        &(m as u64).to_le_bytes(),
                        &(c as u64).to_le_bytes(),
                        challenge_id.as_bytes(),
                    ]);
                    chunk[m] = Element::from_le_bytes(&digest);
                }
                for m in n..l {
                    let offsets = antecedent_offsets(&self.config, chunk, m);
                    let antecedents: Vec<Element> = offsets.iter().map(|&a| chunk[a]).collect();
                    let g = (c * l + m) as u64;
                    chunk[m] = compress(&antecedents, g, challenge_id);
                }
            });
    }

    /// Fetch `X[i]` for `i in [0, T)`.
    #[must_use]
    pub fn get(&self, i: usize) -> Element {
        let l = self.config.chunk_size;
        self.chunks[i / l][i % l]
    }

    /// Reconstruct the antecedent list a prover would disclose for leaf
    /// `i`: a singleton for seed elements (`m < n`), or
    /// the `n` antecedents read during compression otherwise.
    #[must_use]
    pub fn trace_element(&self, i: usize) -> Vec<Element> {
        let l = self.config.chunk_size;
        let n = self.config.antecedent_count;
        let c = i / l;
        let m = i % l;
        if m < n {
            return vec![self.get(i)];
        }
        let chunk = &self.chunks[c];
        antecedent_offsets(&self.config, chunk, m)
            .into_iter()
            .map(|a| chunk[a])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn small_config() -> Config {
        Config::new(8, 2, 4, 8, 9).expect("valid config")
    }

    fn full_challenge() -> ChallengeId {
        ChallengeId::new((0u8..=63).collect::<Vec<u8>>())
    }

    #[test]
    fn build_is_deterministic() {
        let cfg = small_config();
        let challenge = full_challenge();

        let mut m1 = Memory::new(cfg).expect("alloc");
        m1.build_all(&challenge);
        let mut m2 = Memory::new(cfg).expect("alloc");
        m2.build_all(&challenge);

        for i in 0..cfg.total_elements() {
            assert_eq!(m1.get(i).to_le_bytes(), m2.get(i).to_le_bytes());
        }
    }

    #[test]
    fn chunk0_seed_vs_compressed_shape() {
        // Small reference shape: l=8, n=4, P=2, I = [0, 1, ..., 63].
        let cfg = small_config();
        let challenge = full_challenge();
        let mut mem = Memory::new(cfg).expect("alloc");
        mem.build_all(&challenge);

        assert_eq!(mem.trace_element(0).len(), 1);
        assert_eq!(mem.trace_element(4).len(), cfg.antecedent_count);
    }

    #[test]
    fn seed_elements_do_not_depend_on_compression() {
        let cfg = small_config();
        let challenge = full_challenge();
        let mut mem = Memory::new(cfg).expect("alloc");
        mem.build_all(&challenge);
        for m in 0..cfg.antecedent_count {
            let expected = itsuku_crypto::digest64(&[
                &(m as u64).to_le_bytes(),
                &0u64.to_le_bytes(),
                challenge.as_bytes(),
            ]);
            assert_eq!(mem.get(m).to_le_bytes(), expected);
        }
    }

    #[test]
    fn trace_element_recomputation_matches_memory() {
        let cfg = small_config();
        let challenge = full_challenge();
        let mut mem = Memory::new(cfg).expect("alloc");
        mem.build_all(&challenge);

        for m in cfg.antecedent_count..cfg.chunk_size {
            let antecedents = mem.trace_element(m);
            let recomputed = compress(&antecedents, m as u64, &challenge);
            assert_eq!(recomputed.to_le_bytes(), mem.get(m).to_le_bytes());
        }
    }
}
