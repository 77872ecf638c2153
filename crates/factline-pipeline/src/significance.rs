//! Significance filtering
//!
//! Decides whether a discovered item is newsworthy enough to keep in the
//! pipeline. The vocabularies are immutable configuration loaded once and
//! passed by reference; exclusions always win over the whitelist, and feed
//! categories are trusted over the title/summary fallback.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use factline_domain::ArchiveStore;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// Vocabulary configuration for the significance filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Multi-word phrases that mark a text significant.
    pub whitelist_phrases: Vec<String>,

    /// Single tokens that mark a text significant.
    pub whitelist_tokens: Vec<String>,

    /// Multi-word phrases that exclude a text outright.
    pub exclude_phrases: Vec<String>,

    /// Single tokens that exclude a text outright.
    pub exclude_tokens: Vec<String>,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            whitelist_phrases: owned(&[
                "public health",
                "central bank",
                "central banks",
                "human rights",
                "civil rights",
                "public safety",
                "national security",
                "foreign policy",
            ]),
            whitelist_tokens: owned(&[
                "politics",
                "government",
                "election",
                "elections",
                "policy",
                "economy",
                "economic",
                "finance",
                "financial",
                "markets",
                "inflation",
                "health",
                "outbreak",
                "outbreaks",
                "security",
                "defense",
                "war",
                "conflict",
                "conflicts",
                "disaster",
                "disasters",
                "courts",
                "court",
                "justice",
                "corruption",
                "environment",
                "climate",
                "energy",
                "infrastructure",
                "science",
                "technology",
                "tech",
                "cyber",
                "regulation",
                "regulatory",
                "sanctions",
                "trade",
                "immigration",
                "refugees",
            ]),
            exclude_phrases: owned(&[
                "opinion",
                "editorial",
                "op-ed",
                "entertainment",
                "celebrity",
                "lifestyle",
                "travel",
                "fashion",
                "food",
                "sports",
                "horoscope",
            ]),
            exclude_tokens: owned(&[
                "opinion",
                "editorial",
                "opinionated",
                "column",
                "commentary",
                "sports",
                "sport",
                "entertainment",
                "celebrity",
                "lifestyle",
                "travel",
                "fashion",
                "food",
                "horoscope",
                "culture",
            ]),
        }
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn matches_phrases(text: &str, phrases: &[String]) -> bool {
    let lowered = text.to_lowercase();
    phrases.iter().any(|phrase| lowered.contains(phrase))
}

fn intersects(tokens: &HashSet<String>, vocabulary: &[String]) -> bool {
    vocabulary.iter().any(|word| tokens.contains(word))
}

impl SignificanceConfig {
    fn text_is_significant(&self, text: &str) -> bool {
        if matches_phrases(text, &self.exclude_phrases) {
            return false;
        }
        let tokens = tokenize(text);
        if intersects(&tokens, &self.exclude_tokens) {
            return false;
        }
        if matches_phrases(text, &self.whitelist_phrases) {
            return true;
        }
        intersects(&tokens, &self.whitelist_tokens)
    }

    /// Judge an item's significance from its feed categories, falling back
    /// to title + summary when no categories were supplied.
    pub fn is_significant(&self, categories: &[String], title: &str, summary: &str) -> bool {
        let category_text = categories.join(" ");
        let category_text = category_text.trim();
        if !category_text.is_empty() {
            return self.text_is_significant(category_text);
        }

        let fallback = format!("{title} {summary}");
        let fallback = fallback.trim();
        if fallback.is_empty() {
            return false;
        }
        self.text_is_significant(fallback)
    }
}

/// Filter recently discovered items that the vocabulary judges
/// insignificant.
///
/// Items with an unset verdict are evaluated from their title first. Items
/// judged not significant are marked `is_filtered` with capture status
/// "filtered". Returns how many items were (or, under `dry_run`, would be)
/// filtered.
pub fn filter_insignificant<S>(
    store: &mut S,
    cutoff: DateTime<Utc>,
    config: &SignificanceConfig,
    dry_run: bool,
) -> Result<usize, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let candidates = store
        .list_source_items_discovered_since(cutoff)
        .map_err(PipelineError::store)?;

    let mut filtered = 0;
    for mut item in candidates {
        let verdict = match item.is_significant {
            Some(verdict) => verdict,
            None => config.is_significant(&[], item.title.as_deref().unwrap_or(""), ""),
        };
        if verdict {
            if item.is_significant.is_none() && !dry_run {
                item.is_significant = Some(true);
                store
                    .update_source_item(&item)
                    .map_err(PipelineError::store)?;
            }
            continue;
        }

        filtered += 1;
        if dry_run {
            continue;
        }
        item.is_significant = Some(false);
        item.is_filtered = true;
        item.capture_status = Some("filtered".to_string());
        store
            .update_source_item(&item)
            .map_err(PipelineError::store)?;
    }

    info!(filtered, dry_run, "significance sweep complete");
    Ok(filtered)
}
