//! Rule-based claim extraction
//!
//! Shallow lexical rules only: headline/lead sentences, digit-bearing
//! sentences, and quoted spans. No I/O and no parsing beyond regex.

use crate::normalize::normalize;
use factline_domain::ClaimType;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static SENTENCE_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]{3,})""#).unwrap());
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

/// How many sentences after the headline are treated as lead sentences.
const LEAD_SENTENCE_COUNT: usize = 2;

/// A candidate claim produced by extraction, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedClaim {
    /// Whitespace-canonicalized claim text.
    pub normalized_text: String,

    /// Which rule produced the claim.
    pub claim_type: ClaimType,

    /// The original span the claim was lifted from.
    pub excerpt: String,
}

impl ExtractedClaim {
    fn build(raw: &str, claim_type: ClaimType) -> Option<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return None;
        }
        Some(Self {
            normalized_text: normalized,
            claim_type,
            excerpt: raw.to_string(),
        })
    }
}

/// Split on `.`, `!`, or `?` followed by whitespace; fragments keep their
/// terminal punctuation and empty fragments are dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Vec::new();
    }
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY_RE.find_iter(stripped) {
        // The punctuation mark is a single ASCII byte.
        let end = boundary.start() + 1;
        let fragment = stripped[start..end].trim();
        if !fragment.is_empty() {
            sentences.push(fragment);
        }
        start = boundary.end();
    }
    let tail = stripped[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Derive candidate claims from a document's text.
///
/// Rules, applied in order:
/// 1. "what": the first sentence plus the next two lead sentences.
/// 2. "number": every sentence containing a decimal digit.
/// 3. "quote": every double-quoted span of length >= 3 in the unsplit text.
///
/// Candidates are deduplicated by (normalized_text, claim_type), first
/// occurrence winning, so a sentence matched by two rules yields one claim
/// per rule at most. Empty or whitespace-only input yields an empty list.
pub fn extract_claims(text: &str) -> Vec<ExtractedClaim> {
    let sentences = split_sentences(text);
    let mut claims: Vec<ExtractedClaim> = Vec::new();

    if let Some((headline, rest)) = sentences.split_first() {
        claims.extend(ExtractedClaim::build(headline, ClaimType::What));
        for lead in rest.iter().take(LEAD_SENTENCE_COUNT) {
            claims.extend(ExtractedClaim::build(lead, ClaimType::What));
        }
    }

    for sentence in &sentences {
        if DIGIT_RE.is_match(sentence) {
            claims.extend(ExtractedClaim::build(sentence, ClaimType::Number));
        }
    }

    for capture in QUOTE_RE.captures_iter(text) {
        let quoted = capture[1].trim();
        claims.extend(ExtractedClaim::build(quoted, ClaimType::Quote));
    }

    let mut seen: HashSet<(String, ClaimType)> = HashSet::new();
    claims
        .into_iter()
        .filter(|claim| seen.insert((claim.normalized_text.clone(), claim.claim_type)))
        .collect()
}
