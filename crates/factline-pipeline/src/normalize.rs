//! Text normalization and the content-hash dedup index

use crate::error::PipelineError;
use factline_domain::ids::NormalizedTextId;
use factline_domain::{ArchiveStore, NormalizedText, SourceItem};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::debug;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize whitespace: trim the ends and collapse every internal run
/// of whitespace (spaces, tabs, newlines) to a single space.
///
/// Pure and total; idempotent by construction.
pub fn normalize(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Record the normalized text for a SourceItem, deduplicating by content
/// hash.
///
/// Idempotent per item: an existing record is returned unchanged. For a new
/// record, any earlier NormalizedText sharing the hash donates its source
/// item id as the canonical reference: first-seen wins, and the pointer is
/// never revisited. The store's unique index on `source_item_id` makes the
/// insert safe under concurrent workers.
pub fn upsert_normalized<S>(
    store: &mut S,
    source_item: &SourceItem,
    raw_text: &str,
) -> Result<NormalizedText, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    if let Some(existing) = store
        .get_normalized_text(source_item.id)
        .map_err(PipelineError::store)?
    {
        return Ok(existing);
    }

    let normalized = normalize(raw_text);
    let text_hash = content_hash(&normalized);
    let canonical = store
        .find_normalized_text_by_hash(&text_hash)
        .map_err(PipelineError::store)?;
    if let Some(canonical) = &canonical {
        debug!(
            source_item = %source_item.id,
            canonical = %canonical.source_item_id,
            "duplicate content hash"
        );
    }

    let record = NormalizedText {
        id: NormalizedTextId::new(),
        source_item_id: source_item.id,
        canonical_source_item_id: canonical.map(|c| c.source_item_id),
        text_hash,
        normalized_text: normalized,
        created_at: chrono::Utc::now(),
    };
    store
        .insert_normalized_text(record)
        .map_err(PipelineError::store)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: normalization is idempotent for arbitrary input.
        #[test]
        fn test_normalize_idempotent(raw in ".*") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: normalized output never holds a doubled space or
        /// non-space whitespace.
        #[test]
        fn test_normalize_canonical_form(raw in ".*") {
            let out = normalize(&raw);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.chars().any(|c| c.is_whitespace() && c != ' '));
        }

        /// Property: equal normalized text always hashes equally.
        #[test]
        fn test_hash_deterministic(raw in ".*") {
            prop_assert_eq!(content_hash(&normalize(&raw)), content_hash(&normalize(&raw)));
        }
    }
}
