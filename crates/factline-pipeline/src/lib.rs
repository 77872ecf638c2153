//! Factline Processing Pipeline
//!
//! The algorithmic core of the archive: whitespace normalization and
//! content-hash dedup, greedy same-day event clustering, rule-based claim
//! extraction, signal-driven truth-status scoring, significance filtering,
//! and the read-side query surface. Everything operates through the
//! `ArchiveStore` trait; capture and ingestion are collaborators that feed
//! the store before these passes run.
//!
//! All operations here are synchronous and restartable. Check-then-insert
//! steps rely on the store's uniqueness constraints for idempotency under
//! concurrent workers.

#![warn(missing_docs)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod extract;
pub mod html;
pub mod normalize;
pub mod process;
pub mod review;
pub mod scoring;
pub mod significance;

pub use cluster::{cluster_source_item, cluster_source_items, title_similarity};
pub use config::ClusterConfig;
pub use error::PipelineError;
pub use extract::{extract_claims, ExtractedClaim};
pub use normalize::{content_hash, normalize, upsert_normalized};
pub use review::{
    day_detail, day_range_summary, event_detail, override_assessment, DayDetail, DaySummary,
    EventDetail, OverrideRequest,
};
pub use scoring::{compute_signals, create_assessment_if_missing, derive_status, rationale};
pub use significance::SignificanceConfig;
