//! Capture artifacts produced by the browser-capture collaborator

use crate::ids::{ArtifactId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of capture an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Extracted page text.
    Text,
    /// Raw page HTML.
    Html,
    /// Full-page screenshot.
    Screenshot,
    /// Rendered PDF.
    Pdf,
}

impl ArtifactKind {
    /// The storage-layer string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Text => "text",
            ArtifactKind::Html => "html",
            ArtifactKind::Screenshot => "screenshot",
            ArtifactKind::Pdf => "pdf",
        }
    }

    /// Parse a storage-layer string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ArtifactKind::Text),
            "html" => Some(ArtifactKind::Html),
            "screenshot" => Some(ArtifactKind::Screenshot),
            "pdf" => Some(ArtifactKind::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured representation of a SourceItem.
///
/// The capture collaborator validates size limits before a record reaches
/// the core; artifacts handed over are treated as clean input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Stable identity.
    pub id: ArtifactId,

    /// The SourceItem this artifact captures.
    pub source_item_id: SourceItemId,

    /// Kind of capture.
    pub kind: ArtifactKind,

    /// Where the raw bytes live.
    pub storage_uri: String,

    /// Size on disk, when recorded.
    pub bytes: Option<i64>,

    /// Lowercase hex SHA-256 of the raw bytes.
    pub sha256: String,

    /// When the artifact was captured.
    pub created_at: DateTime<Utc>,

    /// Version of the capture tool that produced it.
    pub tool_version: Option<String>,
}
