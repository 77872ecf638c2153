//! Source documents and their normalized-text dedup records

use crate::date_key::DateKey;
use crate::ids::{NormalizedTextId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discovered document (article, page) tracked by URL.
///
/// SourceItems are created by the ingestion collaborator and mutated by
/// capture (status fields) and by the filtering step (`is_filtered`). The
/// core never deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Stable identity.
    pub id: SourceItemId,

    /// URL the document was discovered under.
    pub url: String,

    /// Canonicalized URL, when the ingester resolved one.
    pub canonical_url: Option<String>,

    /// Document title as ingested.
    pub title: Option<String>,

    /// Publishing outlet, when known.
    pub publisher: Option<String>,

    /// Publication timestamp claimed by the source.
    pub published_at: Option<DateTime<Utc>>,

    /// When the archive first saw the document.
    pub discovered_at: DateTime<Utc>,

    /// Raw response headers recorded at fetch time.
    pub fetch_headers: Option<serde_json::Value>,

    /// MIME type reported by the source.
    pub content_type: Option<String>,

    /// Detected language code.
    pub language: Option<String>,

    /// Capture fidelity tier.
    pub capture_tier: i64,

    /// Capture lifecycle status ("capturing", "captured", "filtered", ...).
    pub capture_status: Option<String>,

    /// Significance verdict; `None` until the filter has evaluated the item.
    pub is_significant: Option<bool>,

    /// Whether the item has been filtered out of the pipeline.
    pub is_filtered: bool,
}

impl SourceItem {
    /// A new item as the ingestion collaborator would hand it over.
    pub fn new(url: impl Into<String>, discovered_at: DateTime<Utc>) -> Self {
        Self {
            id: SourceItemId::new(),
            url: url.into(),
            canonical_url: None,
            title: None,
            publisher: None,
            published_at: None,
            discovered_at,
            fetch_headers: None,
            content_type: None,
            language: None,
            capture_tier: 1,
            capture_status: None,
            is_significant: None,
            is_filtered: false,
        }
    }

    /// The UTC calendar day the item was discovered on.
    pub fn date_key(&self) -> DateKey {
        DateKey::from_datetime(self.discovered_at)
    }
}

/// The dedup ledger record: normalized text plus content hash, 1:1 with a
/// SourceItem. Created once and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    /// Stable identity.
    pub id: NormalizedTextId,

    /// The SourceItem this text was derived from (unique per item).
    pub source_item_id: SourceItemId,

    /// First-seen SourceItem sharing the same content hash, when this text
    /// is a duplicate. Never re-pointed once set.
    pub canonical_source_item_id: Option<SourceItemId>,

    /// Lowercase hex SHA-256 of the normalized text.
    pub text_hash: String,

    /// Whitespace-canonicalized document text.
    pub normalized_text: String,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}
