// crates/itsuku-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use itsuku_core::{ChallengeId, Config, Memory};
use itsuku_merkle::MerkleTree;
use itsuku_proof::io::{read_proof_auto, write_proof_auto};
use itsuku_proof::{proof_search, proof_search_parallel, proof_verify};
use rand::RngCore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Itsuku memory-hard proof-of-work reference CLI.
///
/// This binary is the peripheral driver sitting on top of the core crates:
/// argument parsing, help text, random challenge generation, human-readable
/// output, and timing reports. All PoW semantics live in `itsuku-core`,
/// `itsuku-merkle`, and `itsuku-proof`.
#[derive(Parser, Debug)]
#[command(
    name = "itsuku-cli",
    about = "Itsuku memory-hard proof-of-work reference CLI",
    long_about = "Itsuku memory-hard proof-of-work reference CLI.\n\nUse this tool to build memory, commit a Merkle root, search for a proof, and verify one.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build memory, commit a Merkle root, search for a winning nonce,
    /// and write the resulting proof to disk.
    Prove {
        /// Elements per chunk, as a power of two (l = 2^bits).
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..64))]
        chunk_size_bits: u32,

        /// Chunk count, as a power of two (P = 2^bits).
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..64))]
        chunk_count_bits: u32,

        /// Predecessors compressed per non-seed element (n).
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
        antecedent_count: u64,

        /// Required leading zero bits of the final omega digest (d).
        #[arg(long, default_value_t = 24)]
        difficulty_bits: u32,

        /// Steps in the nonce-driven walk (L).
        #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u64).range(1..))]
        search_length: u64,

        /// Challenge bytes, given as hex. If omitted, a random challenge
        /// of `--challenge-len` bytes is generated.
        #[arg(long)]
        challenge_hex: Option<String>,

        /// Length, in bytes, of a randomly generated challenge (ignored
        /// if `--challenge-hex` is given).
        #[arg(long, default_value_t = 64)]
        challenge_len: usize,

        /// Worker threads for the nonce search (1 = sequential reference
        /// loop).
        #[arg(long, default_value_t = 1)]
        threads: usize,

        /// Output path for the proof (`.json` or `.cbor`).
        #[arg(long, default_value = "proof.json")]
        out: PathBuf,
    },

    /// Verify a proof produced by `prove`.
    Verify {
        /// Input path to the proof (`.json` or `.cbor`).
        #[arg(long)]
        proof: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Prove {
            chunk_size_bits,
            chunk_count_bits,
            antecedent_count,
            difficulty_bits,
            search_length,
            challenge_hex,
            challenge_len,
            threads,
            out,
        } => prove(
            chunk_size_bits,
            chunk_count_bits,
            antecedent_count,
            difficulty_bits,
            search_length,
            challenge_hex,
            challenge_len,
            threads,
            out,
        ),
        Cmd::Verify { proof } => verify(proof),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn parse_challenge_hex(hex_str: &str) -> Result<Vec<u8>> {
    if hex_str.len() % 2 != 0 {
        bail!("challenge hex string must have an even number of digits");
    }
    (0..hex_str.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex_str[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte at offset {i}"))
        })
        .collect()
}

fn random_challenge(len: usize) -> ChallengeId {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    ChallengeId::new(bytes)
}

#[allow(clippy::too_many_arguments)]
fn prove(
    chunk_size_bits: u32,
    chunk_count_bits: u32,
    antecedent_count: u64,
    difficulty_bits: u32,
    search_length: u64,
    challenge_hex: Option<String>,
    challenge_len: usize,
    threads: usize,
    out: PathBuf,
) -> Result<()> {
    let config = Config::new(
        1usize
            .checked_shl(chunk_size_bits)
            .ok_or_else(|| anyhow!("chunk_size_bits too large"))?,
        1usize
            .checked_shl(chunk_count_bits)
            .ok_or_else(|| anyhow!("chunk_count_bits too large"))?,
        antecedent_count as usize,
        difficulty_bits,
        search_length as usize,
    )
    .context("invalid config")?;

    let challenge_id = match challenge_hex {
        Some(hex_str) => ChallengeId::new(parse_challenge_hex(&hex_str)?),
        None => random_challenge(challenge_len),
    };

    info!(
        chunk_size = config.chunk_size,
        chunk_count = config.chunk_count,
        antecedent_count = config.antecedent_count,
        difficulty_bits = config.difficulty_bits,
        search_length = config.search_length,
        total_elements = config.total_elements(),
        "proving"
    );

    let build_start = Instant::now();
    let mut memory = Memory::new(config).context("allocating memory")?;
    memory.build_all(&challenge_id);
    let build_elapsed = build_start.elapsed();

    let merkle_start = Instant::now();
    let mut tree = MerkleTree::new(config).context("allocating merkle tree")?;
    tree.compute_leaves(&challenge_id, &memory);
    tree.compute_intermediates(&challenge_id);
    let merkle_elapsed = merkle_start.elapsed();

    let search_start = Instant::now();
    let proof = if threads <= 1 {
        proof_search(&config, &challenge_id, &memory, &tree, None)
    } else {
        proof_search_parallel(&config, &challenge_id, &memory, &tree, threads)
    }
    .ok_or_else(|| anyhow!("nonce domain exhausted without finding a proof"))?;
    let search_elapsed = search_start.elapsed();

    write_proof_auto(&out, &proof)
        .with_context(|| format!("writing proof to {}", out.display()))?;

    println!(
        "Proved nonce={} leaves={} -> {}",
        proof.nonce,
        proof.leaf_count(),
        out.display()
    );
    println!(
        "Timing: build={:.3}s merkle={:.3}s search={:.3}s",
        build_elapsed.as_secs_f64(),
        merkle_elapsed.as_secs_f64(),
        search_elapsed.as_secs_f64()
    );
    Ok(())
}

fn verify(proof_path: PathBuf) -> Result<()> {
    info!(proof = %proof_path.display(), "verifying proof");
    let proof = read_proof_auto(&proof_path)
        .with_context(|| format!("reading proof from {}", proof_path.display()))?;

    match proof_verify(&proof) {
        Ok(()) => {
            println!("OK: proof verified (nonce={})", proof.nonce);
            Ok(())
        }
        Err(kind) => {
            bail!("verification failed: {kind}");
        }
    }
}
