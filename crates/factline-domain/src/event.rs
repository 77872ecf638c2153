//! Same-day event clusters

use crate::date_key::DateKey;
use crate::ids::{EventId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cluster of SourceItems discovered on the same calendar day and judged
/// to report the same happening.
///
/// The title is fixed at creation; it is not re-derived as members join.
/// Events are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identity.
    pub id: EventId,

    /// Representative title, taken from the first member.
    pub title: String,

    /// The UTC calendar day the cluster belongs to.
    pub date_key: DateKey,

    /// When the cluster was created.
    pub created_at: DateTime<Utc>,

    /// Editorial importance, when assigned.
    pub importance_score: Option<f64>,

    /// Free-form tags, when assigned.
    pub tags: Option<Vec<String>>,
}

impl Event {
    /// A fresh cluster with importance and tags unset.
    pub fn new(title: impl Into<String>, date_key: DateKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            title: title.into(),
            date_key,
            created_at,
            importance_score: None,
            tags: None,
        }
    }
}

/// Membership of a SourceItem in an Event: at most one per SourceItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMembership {
    /// The event joined.
    pub event_id: EventId,

    /// The member item.
    pub source_item_id: SourceItemId,

    /// The similarity score that caused the assignment; 0.0 when the event
    /// was created for this item.
    pub confidence: f64,
}
