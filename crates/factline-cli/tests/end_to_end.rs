//! End-to-end pipeline test
//!
//! Drives the full operational sequence the CLI exposes (capture hand-off,
//! normalization, clustering, claim extraction and scoring, a daily log
//! append, and chain verification) against one on-disk store.

use chrono::{TimeZone, Utc};
use factline_domain::ids::ArtifactId;
use factline_domain::{ArchiveStore, Artifact, ArtifactKind, DateKey, SourceItem, TruthStatus};
use factline_pipeline::{ClusterConfig, OverrideRequest};
use factline_store::SqliteStore;
use std::io::Write;

struct Capture<'a> {
    url: &'a str,
    title: &'a str,
    publisher: &'a str,
    body: &'a str,
}

fn hand_over_capture(
    store: &mut SqliteStore,
    dir: &tempfile::TempDir,
    capture: Capture<'_>,
    hour: u32,
) -> SourceItem {
    let mut item = SourceItem::new(
        capture.url.to_string(),
        Utc.with_ymd_and_hms(2026, 1, 7, hour, 0, 0).unwrap(),
    );
    item.title = Some(capture.title.to_string());
    item.publisher = Some(capture.publisher.to_string());
    item.capture_status = Some("captured".to_string());
    let item = store.insert_source_item(item).unwrap();

    let path = dir.path().join(format!("{}.txt", item.id));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(capture.body.as_bytes()).unwrap();

    store
        .insert_artifact(Artifact {
            id: ArtifactId::new(),
            source_item_id: item.id,
            kind: ArtifactKind::Text,
            storage_uri: path.to_string_lossy().into_owned(),
            bytes: Some(capture.body.len() as i64),
            sha256: factline_pipeline::content_hash(capture.body),
            created_at: Utc.with_ymd_and_hms(2026, 1, 7, hour, 5, 0).unwrap(),
            tool_version: Some("capture-test".to_string()),
        })
        .unwrap();
    item
}

#[test]
fn test_full_pipeline_run() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("archive.db");
    let mut store = SqliteStore::new(&db_path).unwrap();
    let cluster_config = ClusterConfig::default();

    // Two outlets report the same story with the same lead sentence; a
    // third story is unrelated.
    let body = "Stocks fell 3%. He said \"markets are nervous\". Reports suggest calm.";
    let first = hand_over_capture(
        &mut store,
        &dir,
        Capture {
            url: "https://wire-a.example/rates",
            title: "Fed raises rates",
            publisher: "Wire A",
            body,
        },
        9,
    );
    hand_over_capture(
        &mut store,
        &dir,
        Capture {
            url: "https://wire-b.example/rates",
            title: "Fed hikes interest rates",
            publisher: "Wire B",
            body,
        },
        10,
    );
    hand_over_capture(
        &mut store,
        &dir,
        Capture {
            url: "https://wire-c.example/volcano",
            title: "Volcano erupts in Iceland",
            publisher: "Wire C",
            body: "Lava reached the coast road overnight.",
        },
        11,
    );

    // Normalize: identical bodies dedup to the first-seen item.
    let processed = factline_pipeline::process::normalize_captured(&mut store).unwrap();
    assert_eq!(processed, 3);
    let texts = store.list_normalized_texts(None).unwrap();
    let canonicals: Vec<_> = texts
        .iter()
        .filter_map(|t| t.canonical_source_item_id)
        .collect();
    assert_eq!(canonicals, vec![first.id]);

    // Cluster: the two rate stories share an event, the volcano gets its own.
    factline_pipeline::process::cluster_pending(&mut store, &cluster_config).unwrap();
    let day: DateKey = "2026-01-07".parse().unwrap();
    let events = store.list_events_by_date_key(&day).unwrap();
    assert_eq!(events.len(), 2);

    // Extract and score. Both rate sources assert the same claims, but the
    // v1 pass runs as each item is processed, so scoring sees only the
    // first source's evidence: the claims stay Unverified even though a
    // second assertion lands afterwards. First write wins.
    factline_pipeline::process::extract_and_score(&mut store, None).unwrap();
    let rates_event = events.iter().find(|e| e.title == "Fed raises rates").unwrap();
    let claims = store.list_claims_by_event(rates_event.id).unwrap();
    assert_eq!(claims.len(), 5);
    for claim in &claims {
        assert_eq!(store.list_assertions_by_claim(claim.id).unwrap().len(), 2);
        let assessment = store.latest_assessment_for_claim(claim.id).unwrap().unwrap();
        assert_eq!(assessment.status, TruthStatus::Unverified.as_str());
        assert_eq!(assessment.score, Some(0.2));
    }

    // The day summary sees both events; every claim queues for review.
    let summary =
        factline_pipeline::day_range_summary(&store, day, day).unwrap();
    assert_eq!(summary[0].event_count, 2);
    let detail = factline_pipeline::day_detail(&store, day).unwrap();
    assert_eq!(detail.review_queue.len(), 6);

    // A human override lands on top of the automatic assessment.
    let overridden = factline_pipeline::override_assessment(
        &mut store,
        claims[0].id,
        OverrideRequest {
            status: "Rejected".to_string(),
            score: Some(0.0),
            rationale: Some(vec!["duplicate wire copy".to_string()]),
        },
    )
    .unwrap();
    let current = store
        .latest_assessment_for_claim(claims[0].id)
        .unwrap()
        .unwrap();
    assert_eq!(current.id, overridden.id);

    // Log the day and verify the chain, then append again and re-verify:
    // the second link is redundant but valid.
    let entry = factline_ledger::append_daily_entry(&mut store, &day).unwrap();
    assert!(entry.previous_root.is_none());
    assert_eq!(factline_ledger::verify_chain(&store).unwrap(), 1);

    let again = factline_ledger::append_daily_entry(&mut store, &day).unwrap();
    assert_eq!(again.previous_root.as_deref(), Some(entry.merkle_root.as_str()));
    assert_eq!(factline_ledger::verify_chain(&store).unwrap(), 2);
}
