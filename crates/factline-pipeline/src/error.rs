//! Error types for the processing pipeline

use thiserror::Error;

/// Errors that can occur during pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Archive store error
    #[error("Store error: {0}")]
    Store(String),

    /// The caller referenced an id that does not exist. Distinct from
    /// "valid id, no data yet", which is an empty result, not an error.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Which entity kind was looked up
        entity: &'static str,
        /// The id the caller passed
        id: String,
    },

    /// The caller passed malformed input (dates, ranges)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A placeholder operation that is deliberately not implemented
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Reading an artifact's stored bytes failed
    #[error("Artifact read error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Wrap a store error, which pipeline callers treat as opaque.
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::Store(err.to_string())
    }
}
