//! Error types for the transparency ledger

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Archive store error
    #[error("Store error: {0}")]
    Store(String),

    /// The hash chain does not link correctly
    #[error(
        "Chain broken at entry {index}: previous_root {found:?} does not match {expected:?}"
    )]
    ChainBroken {
        /// Zero-based position of the offending entry, in creation order
        index: usize,
        /// The root the entry should have linked to
        expected: Option<String>,
        /// The root the entry actually recorded
        found: Option<String>,
    },
}

impl LedgerError {
    /// Wrap a store error, which ledger callers treat as opaque.
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        LedgerError::Store(err.to_string())
    }
}
