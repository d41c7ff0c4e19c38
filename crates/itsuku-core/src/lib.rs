//! Core data types and deterministic memory builder for the Itsuku
//! memory-hard proof-of-work.
//!
//! This crate owns everything leaves-first in the PoW's dependency graph:
//! the immutable [`Config`], the opaque [`ChallengeId`], the 64-byte
//! [`Element`] word type, the pure indexing primitives ([`index`]), and the
//! [`Memory`] builder that fills the data-dependent array keyed by a
//! challenge. Merkle commitment, nonce search, and verification build on
//! top of this crate but live in `itsuku-merkle` and `itsuku-proof`.

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

pub mod challenge;
pub mod config;
pub mod element;
pub mod index;
pub mod memory;

pub use challenge::ChallengeId;
pub use config::Config;
pub use element::Element;
pub use memory::{compress, Memory};
