//! Transparency-log chain entries

use crate::ids::LogEntryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One link in the append-only transparency chain.
///
/// Each entry records the Merkle root of a daily snapshot and the root of
/// the most recently created entry before it. The genesis entry has
/// `previous_root = None`. Entries are strictly append-only; a single
/// writer owns appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyLogEntry {
    /// Stable identity.
    pub id: LogEntryId,

    /// Merkle root of the preceding entry by creation time; `None` for the
    /// first entry.
    pub previous_root: Option<String>,

    /// Merkle root over the day's canonical snapshot.
    pub merkle_root: String,

    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}
