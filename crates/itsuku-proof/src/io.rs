//! Proof serialization helpers (JSON/CBOR, extension auto-detected).
//!
//! Extension-dispatched reader/writer pairs for both formats:
//! `anyhow::Context`, pretty JSON, `ciborium` for CBOR. No wire format is
//! mandated for proof transport beyond a few fixed-width constraints, and
//! `serde`'s derived impls for `BTreeMap`/fixed-size arrays satisfy them by
//! construction (length-prefixed maps, no canonical ordering required).

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::proof::Proof;

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Read a [`Proof`] from **JSON**.
pub fn read_proof_json<P: AsRef<Path>>(path: P) -> Result<Proof> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("deserialize JSON proof")
}

/// Write a [`Proof`] to **JSON** (pretty).
pub fn write_proof_json<P: AsRef<Path>>(path: P, proof: &Proof) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, proof).context("serialize JSON proof")
}

/// Read a [`Proof`] from **CBOR**.
pub fn read_proof_cbor<P: AsRef<Path>>(path: P) -> Result<Proof> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    ciborium::de::from_reader(&mut reader).context("deserialize CBOR proof")
}

/// Write a [`Proof`] to **CBOR**.
pub fn write_proof_cbor<P: AsRef<Path>>(path: P, proof: &Proof) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    ciborium::ser::into_writer(proof, &mut writer).context("serialize CBOR proof")
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_proof_auto<P: AsRef<Path>>(path: P) -> Result<Proof> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("json") => read_proof_json(path),
        Some("cbor") => read_proof_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported proof extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_proof_auto<P: AsRef<Path>>(path: P, proof: &Proof) -> Result<()> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("cbor") => write_proof_cbor(path, proof),
        _ => write_proof_json(path, proof),
    }
}
