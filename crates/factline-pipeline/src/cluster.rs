//! Greedy online event clustering
//!
//! Each SourceItem is either unclustered (no membership) or clustered
//! (exactly one). Clustering buckets items by UTC discovery day and assigns
//! each to the same-day event whose title it most resembles, creating a new
//! event when nothing scores above the threshold.

use crate::config::ClusterConfig;
use crate::error::PipelineError;
use factline_domain::{ArchiveStore, Event, EventMembership, SourceItem};
use similar::TextDiff;
use tracing::{debug, info};

/// Case-insensitive sequence similarity of two titles, in [0, 1].
///
/// The standard two-times-matched-characters-over-total-length ratio:
/// 1.0 for identical strings, 0.0 for disjoint ones, monotonic in partial
/// overlap.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio())
}

/// Assign a SourceItem to an event, creating one if nothing matches.
///
/// Idempotent: an existing membership is returned untouched. Candidate
/// events are scanned in creation order and the strictly highest score wins,
/// so ties keep the earliest candidate. Items without a title always open a
/// new event, titled by URL.
pub fn cluster_source_item<S>(
    store: &mut S,
    source_item: &SourceItem,
    config: &ClusterConfig,
) -> Result<EventMembership, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    if let Some(existing) = store
        .get_membership(source_item.id)
        .map_err(PipelineError::store)?
    {
        return Ok(existing);
    }

    let date_key = source_item.date_key();
    let candidates = store
        .list_events_by_date_key(&date_key)
        .map_err(PipelineError::store)?;

    let mut best_event: Option<&Event> = None;
    let mut best_score = 0.0_f64;
    if let Some(title) = source_item.title.as_deref() {
        for event in &candidates {
            let score = title_similarity(title, &event.title);
            if score >= config.similarity_threshold && score > best_score {
                best_event = Some(event);
                best_score = score;
            }
        }
    }

    match best_event {
        Some(event) => {
            debug!(
                source_item = %source_item.id,
                event = %event.id,
                score = best_score,
                "joined existing event"
            );
            store
                .insert_membership(EventMembership {
                    event_id: event.id,
                    source_item_id: source_item.id,
                    confidence: best_score,
                })
                .map_err(PipelineError::store)
        }
        None => {
            let title = source_item
                .title
                .clone()
                .unwrap_or_else(|| source_item.url.clone());
            let event = Event::new(title, date_key, chrono::Utc::now());
            debug!(source_item = %source_item.id, event = %event.id, "created new event");
            store
                .insert_event_with_membership(
                    event.clone(),
                    EventMembership {
                        event_id: event.id,
                        source_item_id: source_item.id,
                        confidence: 0.0,
                    },
                )
                .map_err(PipelineError::store)
        }
    }
}

/// Cluster a batch of SourceItems independently.
///
/// Returns the number of items processed, not the number of events created.
pub fn cluster_source_items<S, I>(
    store: &mut S,
    items: I,
    config: &ClusterConfig,
) -> Result<usize, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
    I: IntoIterator<Item = SourceItem>,
{
    let mut processed = 0;
    for item in items {
        cluster_source_item(store, &item, config)?;
        processed += 1;
    }
    info!(processed, "clustering batch complete");
    Ok(processed)
}

/// Unfiltered SourceItems that have no event membership yet.
pub fn list_unclustered<S>(store: &S) -> Result<Vec<SourceItem>, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    store
        .list_unclustered_source_items()
        .map_err(PipelineError::store)
}

/// Merging two events is not implemented; callers get a distinct
/// unsupported-operation error, never silent success.
pub fn merge_events<S>(
    _store: &mut S,
    _source_event: factline_domain::EventId,
    _target_event: factline_domain::EventId,
) -> Result<(), PipelineError>
where
    S: ArchiveStore,
{
    Err(PipelineError::Unsupported(
        "merge_events is a placeholder for review-UI wiring",
    ))
}

/// Splitting an event is not implemented; callers get a distinct
/// unsupported-operation error, never silent success.
pub fn split_event<S>(
    _store: &mut S,
    _event: factline_domain::EventId,
    _source_items: &[factline_domain::SourceItemId],
) -> Result<(), PipelineError>
where
    S: ArchiveStore,
{
    Err(PipelineError::Unsupported(
        "split_event is a placeholder for review-UI wiring",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use factline_store::SqliteStore;

    fn titled_item(title: &str, hour: u32) -> SourceItem {
        let mut item = SourceItem::new(
            format!("https://example.org/{}", title.replace(' ', "-")),
            Utc.with_ymd_and_hms(2026, 1, 7, hour, 0, 0).unwrap(),
        );
        item.title = Some(title.to_string());
        item
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(title_similarity("Fed raises rates", "fed raises rates"), 1.0);
        assert_eq!(title_similarity("abc", "xyz"), 0.0);
        let partial = title_similarity("Fed raises rates", "Fed raises interest rates");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_similar_titles_share_an_event() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let first = store
            .insert_source_item(titled_item("Fed raises rates", 9))
            .unwrap();
        let second = store
            .insert_source_item(titled_item("Fed hikes interest rates", 10))
            .unwrap();

        let m1 = cluster_source_item(&mut store, &first, &config).unwrap();
        let m2 = cluster_source_item(&mut store, &second, &config).unwrap();

        assert_eq!(m1.event_id, m2.event_id);
        assert_eq!(m1.confidence, 0.0);
        assert!(m2.confidence >= config.similarity_threshold);

        // The event keeps the first member's title.
        let event = store.get_event(m1.event_id).unwrap().unwrap();
        assert_eq!(event.title, "Fed raises rates");
    }

    #[test]
    fn test_dissimilar_title_opens_new_event() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let first = store
            .insert_source_item(titled_item("Fed raises rates", 9))
            .unwrap();
        let second = store
            .insert_source_item(titled_item("Volcano erupts in Iceland", 10))
            .unwrap();

        let m1 = cluster_source_item(&mut store, &first, &config).unwrap();
        let m2 = cluster_source_item(&mut store, &second, &config).unwrap();

        assert_ne!(m1.event_id, m2.event_id);
        assert_eq!(m2.confidence, 0.0);
    }

    #[test]
    fn test_same_title_on_other_day_does_not_join() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let monday = store
            .insert_source_item(titled_item("Fed raises rates", 9))
            .unwrap();
        let mut tuesday = titled_item("Fed raises rates", 9);
        tuesday.discovered_at = Utc.with_ymd_and_hms(2026, 1, 8, 9, 0, 0).unwrap();
        let tuesday = store.insert_source_item(tuesday).unwrap();

        let m1 = cluster_source_item(&mut store, &monday, &config).unwrap();
        let m2 = cluster_source_item(&mut store, &tuesday, &config).unwrap();
        assert_ne!(m1.event_id, m2.event_id);
    }

    #[test]
    fn test_untitled_item_uses_url_for_event_title() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let item = store
            .insert_source_item(SourceItem::new(
                "https://example.org/untitled",
                Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
            ))
            .unwrap();

        let membership = cluster_source_item(&mut store, &item, &config).unwrap();
        assert_eq!(membership.confidence, 0.0);
        let event = store.get_event(membership.event_id).unwrap().unwrap();
        assert_eq!(event.title, "https://example.org/untitled");
    }

    #[test]
    fn test_cluster_is_idempotent() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();
        let item = store
            .insert_source_item(titled_item("Fed raises rates", 9))
            .unwrap();

        let first = cluster_source_item(&mut store, &item, &config).unwrap();
        let second = cluster_source_item(&mut store, &item, &config).unwrap();
        assert_eq!(first.event_id, second.event_id);
        assert_eq!(store.list_events_by_date_key(&item.date_key()).unwrap().len(), 1);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        // Two same-day events with identical titles; a newcomer scoring
        // 1.0 against both must join the first one considered.
        let date_key = "2026-01-07".parse().unwrap();
        let mut insert_event = |title: &str, hour: u32, member_url: &str| {
            let member = store
                .insert_source_item(SourceItem::new(
                    member_url.to_string(),
                    Utc.with_ymd_and_hms(2026, 1, 7, hour, 0, 0).unwrap(),
                ))
                .unwrap();
            let event = Event::new(
                title,
                date_key,
                Utc.with_ymd_and_hms(2026, 1, 7, hour, 0, 0).unwrap(),
            );
            store
                .insert_event_with_membership(
                    event.clone(),
                    EventMembership {
                        event_id: event.id,
                        source_item_id: member.id,
                        confidence: 0.0,
                    },
                )
                .unwrap()
        };
        let first = insert_event("Fed raises rates", 8, "https://example.org/first");
        insert_event("Fed raises rates", 9, "https://example.org/second");

        let newcomer = store
            .insert_source_item(titled_item("Fed raises rates", 10))
            .unwrap();
        let membership = cluster_source_item(&mut store, &newcomer, &config).unwrap();
        assert_eq!(membership.event_id, first.event_id);
        assert_eq!(membership.confidence, 1.0);
    }

    #[test]
    fn test_batch_counts_processed_not_created() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let config = ClusterConfig::default();

        let items: Vec<SourceItem> = ["Fed raises rates", "Fed hikes interest rates"]
            .iter()
            .enumerate()
            .map(|(i, title)| {
                store
                    .insert_source_item(titled_item(title, 9 + i as u32))
                    .unwrap()
            })
            .collect();

        let processed = cluster_source_items(&mut store, items, &config).unwrap();
        assert_eq!(processed, 2);
    }

    #[test]
    fn test_merge_and_split_fail_loudly() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let a = factline_domain::EventId::new();
        let b = factline_domain::EventId::new();

        let merge = merge_events(&mut store, a, b);
        assert!(matches!(merge, Err(PipelineError::Unsupported(_))));

        let split = split_event(&mut store, a, &[]);
        assert!(matches!(split, Err(PipelineError::Unsupported(_))));
    }
}
