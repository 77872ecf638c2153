//! Typed identifiers for archive entities
//!
//! Every entity carries a UUID primary key. The newtypes keep the id spaces
//! apart at compile time so a claim id cannot be handed to a source-item
//! lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (storage-layer deserialization).
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a discovered source document.
    SourceItemId
);
entity_id!(
    /// Identifier of a capture artifact.
    ArtifactId
);
entity_id!(
    /// Identifier of a normalized-text dedup record.
    NormalizedTextId
);
entity_id!(
    /// Identifier of a same-day event cluster.
    EventId
);
entity_id!(
    /// Identifier of an extracted claim.
    ClaimId
);
entity_id!(
    /// Identifier of a claim assertion (evidence link).
    AssertionId
);
entity_id!(
    /// Identifier of a truth-status assessment.
    AssessmentId
);
entity_id!(
    /// Identifier of a transparency-log entry.
    LogEntryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let id = ClaimId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        let parsed: ClaimId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_invalid_string() {
        assert!("not-a-uuid".parse::<SourceItemId>().is_err());
        assert!("".parse::<EventId>().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
    }
}
