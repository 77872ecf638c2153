//! Batch processing entry points
//!
//! The operational passes a worker runs after capture: normalize captured
//! text, then extract claims from clustered items and score them. Each pass
//! is restartable; every write underneath is an insert-or-get.

use crate::cluster;
use crate::config::ClusterConfig;
use crate::error::PipelineError;
use crate::extract::extract_claims;
use crate::html::html_to_text;
use crate::normalize::upsert_normalized;
use crate::scoring::create_assessment_if_missing;
use factline_domain::{
    ArchiveStore, ArtifactKind, Claim, ClaimAssertion, Polarity, SourceItem,
};
use std::fs;
use tracing::{info, warn};

/// Capture status marking an item ready for normalization.
const STATUS_CAPTURED: &str = "captured";

fn load_artifact_text<S>(
    store: &S,
    item: &SourceItem,
) -> Result<Option<String>, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    if let Some(artifact) = store
        .find_artifact(item.id, ArtifactKind::Text)
        .map_err(PipelineError::store)?
    {
        return Ok(Some(fs::read_to_string(&artifact.storage_uri)?));
    }
    if let Some(artifact) = store
        .find_artifact(item.id, ArtifactKind::Html)
        .map_err(PipelineError::store)?
    {
        let html = fs::read_to_string(&artifact.storage_uri)?;
        return Ok(Some(html_to_text(&html)));
    }
    Ok(None)
}

/// Normalize the captured text of every item marked "captured".
///
/// Items without a text or html artifact are skipped with a warning; the
/// capture collaborator owns producing them. Returns how many items were
/// normalized (including previously normalized no-ops).
pub fn normalize_captured<S>(store: &mut S) -> Result<usize, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let items = store
        .list_source_items_by_capture_status(STATUS_CAPTURED)
        .map_err(PipelineError::store)?;

    let mut processed = 0;
    for item in items {
        let Some(raw_text) = load_artifact_text(store, &item)? else {
            warn!(source_item = %item.id, "captured item has no text artifact");
            continue;
        };
        upsert_normalized(store, &item, &raw_text)?;
        processed += 1;
    }
    info!(processed, "normalization pass complete");
    Ok(processed)
}

/// Cluster every unclustered, unfiltered item.
///
/// Returns the number of items processed.
pub fn cluster_pending<S>(store: &mut S, config: &ClusterConfig) -> Result<usize, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let pending = cluster::list_unclustered(store)?;
    cluster::cluster_source_items(store, pending, config)
}

/// Extract claims from normalized texts and run the v1 scoring pass.
///
/// Walks normalized texts in creation order (up to `limit`), skipping items
/// that are unclustered or filtered. Each extracted candidate becomes a
/// Claim on the item's event (insert-or-get), a supporting assertion from
/// the item (insert-or-get), and a v1 assessment when none exists. Returns
/// the number of normalized texts processed.
pub fn extract_and_score<S>(store: &mut S, limit: Option<usize>) -> Result<usize, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let rows = store
        .list_normalized_texts(limit)
        .map_err(PipelineError::store)?;

    let mut processed = 0;
    for row in rows {
        let Some(membership) = store
            .get_membership(row.source_item_id)
            .map_err(PipelineError::store)?
        else {
            continue;
        };
        let Some(source_item) = store
            .get_source_item(row.source_item_id)
            .map_err(PipelineError::store)?
        else {
            continue;
        };
        if source_item.is_filtered {
            continue;
        }

        for candidate in extract_claims(&row.normalized_text) {
            let claim = store
                .insert_claim(Claim::new(
                    membership.event_id,
                    candidate.normalized_text,
                    candidate.claim_type,
                ))
                .map_err(PipelineError::store)?;
            let mut assertion =
                ClaimAssertion::new(claim.id, row.source_item_id, Polarity::Supports);
            assertion.excerpt = Some(candidate.excerpt);
            store
                .insert_assertion(assertion)
                .map_err(PipelineError::store)?;
            create_assessment_if_missing(store, &claim)?;
        }
        processed += 1;
    }
    info!(processed, "claim extraction pass complete");
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use factline_domain::ids::ArtifactId;
    use factline_domain::{Artifact, ClaimType};
    use factline_store::SqliteStore;
    use std::io::Write;

    fn captured_item(store: &mut SqliteStore, url: &str, title: &str) -> SourceItem {
        let mut item = SourceItem::new(
            url.to_string(),
            Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
        );
        item.title = Some(title.to_string());
        item.capture_status = Some(STATUS_CAPTURED.to_string());
        store.insert_source_item(item).unwrap()
    }

    fn write_artifact(
        store: &mut SqliteStore,
        dir: &tempfile::TempDir,
        item: &SourceItem,
        kind: ArtifactKind,
        body: &str,
    ) {
        let path = dir
            .path()
            .join(format!("{}-{}", item.id, kind.as_str()))
            .to_string_lossy()
            .into_owned();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();

        store
            .insert_artifact(Artifact {
                id: ArtifactId::new(),
                source_item_id: item.id,
                kind,
                storage_uri: path,
                bytes: Some(body.len() as i64),
                sha256: crate::normalize::content_hash(body),
                created_at: Utc::now(),
                tool_version: Some("test-capture".to_string()),
            })
            .unwrap();
    }

    #[test]
    fn test_normalize_captured_reads_text_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(":memory:").unwrap();

        let item = captured_item(&mut store, "https://example.org/a", "A");
        write_artifact(&mut store, &dir, &item, ArtifactKind::Text, "Body  text\nhere");

        let processed = normalize_captured(&mut store).unwrap();
        assert_eq!(processed, 1);

        let record = store.get_normalized_text(item.id).unwrap().unwrap();
        assert_eq!(record.normalized_text, "Body text here");
    }

    #[test]
    fn test_normalize_captured_converts_html() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(":memory:").unwrap();

        let item = captured_item(&mut store, "https://example.org/a", "A");
        write_artifact(
            &mut store,
            &dir,
            &item,
            ArtifactKind::Html,
            "<p>Stocks &amp; bonds fell.</p>",
        );

        normalize_captured(&mut store).unwrap();
        let record = store.get_normalized_text(item.id).unwrap().unwrap();
        assert_eq!(record.normalized_text, "Stocks & bonds fell.");
    }

    #[test]
    fn test_normalize_captured_skips_artifactless_items() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        captured_item(&mut store, "https://example.org/a", "A");
        let processed = normalize_captured(&mut store).unwrap();
        assert_eq!(processed, 0);
    }

    #[test]
    fn test_extract_and_score_full_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let item = captured_item(&mut store, "https://example.org/a", "Fed raises rates");
        write_artifact(
            &mut store,
            &dir,
            &item,
            ArtifactKind::Text,
            "Stocks fell 3%. He said \"markets are nervous\". Reports suggest calm.",
        );

        normalize_captured(&mut store).unwrap();
        cluster_pending(&mut store, &config).unwrap();
        let processed = extract_and_score(&mut store, None).unwrap();
        assert_eq!(processed, 1);

        let membership = store.get_membership(item.id).unwrap().unwrap();
        let claims = store.list_claims_by_event(membership.event_id).unwrap();
        assert_eq!(claims.len(), 5);

        for claim in &claims {
            let assertions = store.list_assertions_by_claim(claim.id).unwrap();
            assert_eq!(assertions.len(), 1);
            assert_eq!(assertions[0].polarity, Polarity::Supports);
            assert!(assertions[0].excerpt.is_some());

            let latest = store.latest_assessment_for_claim(claim.id).unwrap().unwrap();
            // One source, no contradictions.
            assert_eq!(latest.status, "Unverified");
        }

        let quote = claims
            .iter()
            .find(|c| c.claim_type == ClaimType::Quote)
            .unwrap();
        assert_eq!(quote.normalized_text, "markets are nervous");
    }

    #[test]
    fn test_extract_and_score_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let item = captured_item(&mut store, "https://example.org/a", "Fed raises rates");
        write_artifact(&mut store, &dir, &item, ArtifactKind::Text, "Stocks fell 3%.");

        normalize_captured(&mut store).unwrap();
        cluster_pending(&mut store, &config).unwrap();
        extract_and_score(&mut store, None).unwrap();
        extract_and_score(&mut store, None).unwrap();

        let membership = store.get_membership(item.id).unwrap().unwrap();
        let claims = store.list_claims_by_event(membership.event_id).unwrap();
        assert_eq!(claims.len(), 2);
        for claim in &claims {
            assert_eq!(store.list_assertions_by_claim(claim.id).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_extract_skips_filtered_and_unclustered() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let mut filtered =
            captured_item(&mut store, "https://example.org/f", "Cute puppies parade");
        write_artifact(&mut store, &dir, &filtered, ArtifactKind::Text, "Numbers: 1 2 3.");
        let other = captured_item(&mut store, "https://example.org/u", "Volcano erupts in Iceland");
        write_artifact(&mut store, &dir, &other, ArtifactKind::Text, "More numbers: 4.");

        normalize_captured(&mut store).unwrap();
        cluster_pending(&mut store, &config).unwrap();

        // Filtered after clustering: still skipped by the extraction pass.
        filtered.is_filtered = true;
        store.update_source_item(&filtered).unwrap();

        let processed = extract_and_score(&mut store, None).unwrap();
        assert_eq!(processed, 1);

        let membership = store.get_membership(filtered.id).unwrap().unwrap();
        assert!(store
            .list_claims_by_event(membership.event_id)
            .unwrap()
            .is_empty());
    }
}
