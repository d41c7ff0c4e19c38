//! The nonce-driven `L`-step walk shared by search and verification.
//!
//! Both call sites need byte-identical behavior: the prover walks real
//! memory and never fails; the verifier walks a partial, reconstructed
//! element map and must stop the instant a step reads an undisclosed
//! leaf. A single generic function over an element lookup closure keeps
//! both paths bit-for-bit in sync.

use itsuku_core::{ChallengeId, Config, Element};
use itsuku_crypto::{digest64, Digest64Builder};

/// Right-pad `root` (`M` bytes) into a 64-byte OMEGA-sized buffer, low-order
/// bytes first.
#[must_use]
pub(crate) fn pad_root(root: &[u8]) -> [u8; 64] {
    let mut buf = [0u8; 64];
    let n = root.len().min(64);
    buf[..n].copy_from_slice(&root[..n]);
    buf
}

/// Map a walk digest `Y_j` to a memory index in `[0, total_elements)`.
fn index_from_digest(y: &[u8; 64], total_elements: usize) -> usize {
    let mut low8 = [0u8; 8];
    low8.copy_from_slice(&y[..8]);
    (u64::from_le_bytes(low8) % total_elements as u64) as usize
}

/// Outcome of a completed `L`-step walk: the final omega digest, the
/// leaf indices visited (in order), and every intermediate `Y_j`.
pub(crate) struct WalkOutcome {
    pub omega: [u8; 64],
    pub visited: Vec<usize>,
}

/// Replay the walk, reading elements
/// through `read`. Returns `None` the moment `read` cannot supply an
/// element -- the verifier's signal that the replay visited an
/// undisclosed leaf (`UnprovenLeafInPath`).
pub(crate) fn run_walk<F>(
    config: &Config,
    challenge_id: &ChallengeId,
    root: &[u8],
    nonce: u64,
    mut read: F,
) -> Option<WalkOutcome>
where
    F: FnMut(usize) -> Option<Element>,
{
    let total_elements = config.total_elements();
    let padded_root = pad_root(root);

    let mut ys: Vec<[u8; 64]> = Vec::with_capacity(config.search_length + 1);
    ys.push(digest64(&[
        &nonce.to_le_bytes(),
        &padded_root,
        challenge_id.as_bytes(),
    ]));

    let mut visited = Vec::with_capacity(config.search_length);
    for _ in 0..config.search_length {
        let y_prev = *ys.last().expect("ys always holds at least Y_0");
        let idx = index_from_digest(&y_prev, total_elements);
        let mut element = read(idx)?;
        element.xor_assign_bytes(challenge_id.as_bytes());
        let y_next = digest64(&[&y_prev, &element.to_le_bytes()]);
        visited.push(idx);
        ys.push(y_next);
    }

    let mut builder = Digest64Builder::new();
    for y in ys.iter().skip(1).rev() {
        builder.update(y);
    }
    let mut e0 = Element::from_le_bytes(&ys[0]);
    e0.xor_assign_bytes(challenge_id.as_bytes());
    builder.update(&e0.to_le_bytes());
    let omega = builder.finalize();

    Some(WalkOutcome { omega, visited })
}
