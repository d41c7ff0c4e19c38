//! Cross-cutting invariants for the memory builder.
//!
//! These tests treat `Memory` as authoritative for the data-model
//! invariants that no single unit test inside `src/memory.rs` captures on
//! its own: determinism across independent builds and independence of
//! each chunk/seed-element from parameters that should not affect it.

use itsuku_core::{ChallengeId, Config, Memory};
use proptest::prelude::*;

fn build(cfg: Config, challenge: &ChallengeId) -> Memory {
    let mut memory = Memory::new(cfg).expect("alloc");
    memory.build_all(challenge);
    memory
}

#[test]
fn chunk_zero_is_independent_of_chunk_count() {
    // Changing chunk_count must not perturb the bytes already written for
    // earlier chunks, since the compression recurrence only ever reads
    // within its own chunk.
    let challenge = ChallengeId::new((0u8..=63).collect::<Vec<u8>>());
    let small = Config::new(8, 1, 4, 8, 9).expect("valid");
    let large = Config::new(8, 3, 4, 8, 9).expect("valid");

    let m_small = build(small, &challenge);
    let m_large = build(large, &challenge);

    for i in 0..small.total_elements() {
        assert_eq!(
            m_small.get(i).to_le_bytes(),
            m_large.get(i).to_le_bytes(),
            "chunk 0 must be identical regardless of chunk_count"
        );
    }
}

#[test]
fn seed_elements_ignore_chunk_size() {
    // The first n elements of a chunk are hash-seeded from (m, c, I) alone
    // and must not depend on chunk_size.
    let challenge = ChallengeId::new((0u8..=63).collect::<Vec<u8>>());
    let narrow = Config::new(8, 2, 4, 8, 9).expect("valid");
    let wide = Config::new(16, 2, 4, 8, 9).expect("valid");

    let m_narrow = build(narrow, &challenge);
    let m_wide = build(wide, &challenge);

    for m in 0..narrow.antecedent_count {
        assert_eq!(
            m_narrow.get(m).to_le_bytes(),
            m_wide.get(m).to_le_bytes(),
            "seed element {m} must not depend on chunk_size"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn build_all_is_deterministic_across_independent_builds(
        chunk_size in 4usize..32,
        chunk_count in 1usize..4,
        antecedent_count in 1usize..4,
        challenge_len in 1usize..65,
    ) {
        let antecedent_count = antecedent_count.min(chunk_size);
        let cfg = Config::new(chunk_size, chunk_count, antecedent_count, 8, 1)
            .expect("constrained inputs are always valid");
        let challenge = ChallengeId::new(vec![0x42u8; challenge_len]);

        let a = build(cfg, &challenge);
        let b = build(cfg, &challenge);
        for i in 0..cfg.total_elements() {
            prop_assert_eq!(a.get(i).to_le_bytes(), b.get(i).to_le_bytes());
        }
    }

    #[test]
    fn different_challenges_diverge_somewhere(
        chunk_size in 8usize..32,
        antecedent_count in 1usize..4,
    ) {
        let antecedent_count = antecedent_count.min(chunk_size);
        let cfg = Config::new(chunk_size, 1, antecedent_count, 8, 1)
            .expect("constrained inputs are always valid");
        let challenge_a = ChallengeId::new(vec![0x01u8; 8]);
        let challenge_b = ChallengeId::new(vec![0x02u8; 8]);

        let a = build(cfg, &challenge_a);
        let b = build(cfg, &challenge_b);

        let differs = (0..cfg.total_elements())
            .any(|i| a.get(i).to_le_bytes() != b.get(i).to_le_bytes());
        prop_assert!(differs, "distinct challenges must not collapse to identical memory");
    }
}
