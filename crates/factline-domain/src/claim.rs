//! Claims and their evidence links

use crate::ids::{AssertionId, ClaimId, EventId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The extraction rule that produced a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    /// Headline/lead sentence.
    What,
    /// Sentence containing a decimal digit.
    Number,
    /// Double-quoted span.
    Quote,
}

impl ClaimType {
    /// The storage-layer string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::What => "what",
            ClaimType::Number => "number",
            ClaimType::Quote => "quote",
        }
    }

    /// Parse a storage-layer string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "what" => Some(ClaimType::What),
            "number" => Some(ClaimType::Number),
            "quote" => Some(ClaimType::Quote),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic factual statement scoped to an Event.
///
/// Identified by (event_id, normalized_text, claim_type); re-extraction is
/// idempotent against that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Stable identity.
    pub id: ClaimId,

    /// The event the statement is about.
    pub event_id: EventId,

    /// Whitespace-canonicalized statement text.
    pub normalized_text: String,

    /// Which extraction rule produced the claim.
    pub claim_type: ClaimType,

    /// Named entities, when an enrichment pass has recorded them.
    pub entities: Option<serde_json::Value>,

    /// Parsed numeric fields, when an enrichment pass has recorded them.
    pub numeric_fields: Option<serde_json::Value>,
}

impl Claim {
    /// A new claim with enrichment columns unset.
    pub fn new(event_id: EventId, normalized_text: impl Into<String>, claim_type: ClaimType) -> Self {
        Self {
            id: ClaimId::new(),
            event_id,
            normalized_text: normalized_text.into(),
            claim_type,
            entities: None,
            numeric_fields: None,
        }
    }
}

/// Whether an assertion supports, denies, or merely mentions a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// The source corroborates the claim.
    Supports,
    /// The source contradicts the claim.
    Denies,
    /// The source mentions the claim without taking a side.
    Neutral,
}

impl Polarity {
    /// The storage-layer string for this polarity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Supports => "supports",
            Polarity::Denies => "denies",
            Polarity::Neutral => "neutral",
        }
    }

    /// Parse a storage-layer string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "supports" => Some(Polarity::Supports),
            "denies" => Some(Polarity::Denies),
            "neutral" => Some(Polarity::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence link from a Claim to a SourceItem.
///
/// One per (claim, source item); multiple assertions per claim are expected,
/// one per corroborating or contradicting source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAssertion {
    /// Stable identity.
    pub id: AssertionId,

    /// The claim asserted about.
    pub claim_id: ClaimId,

    /// The asserting source.
    pub source_item_id: SourceItemId,

    /// Character span in the source text, when recorded.
    pub extracted_span: Option<String>,

    /// Verbatim excerpt backing the assertion.
    pub excerpt: Option<String>,

    /// Which side the source takes.
    pub polarity: Polarity,

    /// When the source made the assertion, when known.
    pub assertion_time: Option<DateTime<Utc>>,
}

impl ClaimAssertion {
    /// A new assertion with span and timestamp unset.
    pub fn new(claim_id: ClaimId, source_item_id: SourceItemId, polarity: Polarity) -> Self {
        Self {
            id: AssertionId::new(),
            claim_id,
            source_item_id,
            extracted_span: None,
            excerpt: None,
            polarity,
            assertion_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_type_roundtrip() {
        for ct in [ClaimType::What, ClaimType::Number, ClaimType::Quote] {
            assert_eq!(ClaimType::parse(ct.as_str()), Some(ct));
        }
        assert_eq!(ClaimType::parse("who"), None);
    }

    #[test]
    fn test_polarity_roundtrip() {
        for p in [Polarity::Supports, Polarity::Denies, Polarity::Neutral] {
            assert_eq!(Polarity::parse(p.as_str()), Some(p));
        }
        assert_eq!(Polarity::parse("maybe"), None);
    }
}
