//! Factline Transparency Ledger
//!
//! Proves the archive's history has not been altered retroactively: every
//! day's SourceItems, Artifacts, and Assessments are reduced to canonical
//! snapshots, hashed into a Merkle root, and chained to the previous root.
//! Entries are hash-linked only, without signatures or consensus; a single
//! authoritative writer owns appends.

#![warn(missing_docs)]

pub mod canonical;
pub mod error;
pub mod log;
pub mod merkle;

pub use canonical::{artifact_payload, assessment_payload, hash_payload, source_item_payload};
pub use error::LedgerError;
pub use log::{append_daily_entry, compute_daily_root, daily_leaf_hashes, verify_chain, verify_entries};
pub use merkle::{merkle_root, sha256_hex};
