//! Truth-status assessments and their computed signals

use crate::ids::{AssessmentId, ClaimId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model version tag for the automatic v1 scoring pass.
pub const MODEL_VERSION_V1: &str = "v1";

/// Model version tag for human review overrides.
pub const MODEL_VERSION_HUMAN: &str = "human";

/// Truth statuses the automatic scorer can derive.
///
/// Human overrides may record statuses outside this set; `Assessment.status`
/// is therefore a plain string at the record level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TruthStatus {
    /// No corroboration yet.
    Unverified,
    /// At least two independent sources agree.
    Corroborated,
    /// At least one source denies the claim.
    Contested,
}

impl TruthStatus {
    /// The display/storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TruthStatus::Unverified => "Unverified",
            TruthStatus::Corroborated => "Corroborated",
            TruthStatus::Contested => "Contested",
        }
    }

    /// Parse a display/storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Unverified" => Some(TruthStatus::Unverified),
            "Corroborated" => Some(TruthStatus::Corroborated),
            "Contested" => Some(TruthStatus::Contested),
            _ => None,
        }
    }
}

impl std::fmt::Display for TruthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw evidence aggregates a status is derived from.
///
/// `primary_evidence_present` and `correction_seen` are reserved signals,
/// always false in the v1 rule set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// Distinct non-null publishers among asserting sources.
    pub independent_sources_count: u64,

    /// Assertions with polarity `denies`.
    pub contradiction_count: u64,

    /// Reserved: primary evidence (documents, filings) detected.
    pub primary_evidence_present: bool,

    /// Reserved: a correction or retraction was seen.
    #[serde(rename = "correction_or_retraction_seen")]
    pub correction_seen: bool,
}

/// A scored snapshot of a Claim's truth status at a point in time.
///
/// Assessments are append-only history: one automatic v1 row per claim plus
/// any number of human overrides. The "current" status is the assessment
/// with the latest creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Stable identity.
    pub id: AssessmentId,

    /// The claim assessed.
    pub claim_id: ClaimId,

    /// "v1" for the automatic pass, "human" for overrides.
    pub model_version: String,

    /// When the assessment was recorded.
    pub created_at: DateTime<Utc>,

    /// Derived or overridden status.
    pub status: String,

    /// Numeric score tied to the status.
    pub score: Option<f64>,

    /// Ordered human-readable justifications.
    pub rationale: Vec<String>,

    /// The signal aggregates the status was derived from; `None` for human
    /// overrides, which carry no computed evidence.
    pub computed_signals: Option<Signals>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TruthStatus::Unverified,
            TruthStatus::Corroborated,
            TruthStatus::Contested,
        ] {
            assert_eq!(TruthStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TruthStatus::parse("Disputed"), None);
    }

    #[test]
    fn test_signals_serialize_with_wire_names() {
        let signals = Signals {
            independent_sources_count: 2,
            contradiction_count: 0,
            primary_evidence_present: false,
            correction_seen: false,
        };
        let json = serde_json::to_string(&signals).unwrap();
        assert!(json.contains("correction_or_retraction_seen"));
        assert!(json.contains("independent_sources_count"));
    }

    #[test]
    fn test_signals_default_is_empty_evidence() {
        let signals = Signals::default();
        assert_eq!(signals.independent_sources_count, 0);
        assert_eq!(signals.contradiction_count, 0);
        assert!(!signals.primary_evidence_present);
        assert!(!signals.correction_seen);
    }
}
