//! Canonical snapshot serialization
//!
//! Each logged record is reduced to a fixed field-set, serialized as
//! compact JSON with lexicographically sorted keys, and hashed. The field
//! sets are part of the verification contract: changing them changes every
//! future root.

use crate::merkle::sha256_hex;
use chrono::{DateTime, SecondsFormat, Utc};
use factline_domain::{Artifact, Assessment, SourceItem};
use serde_json::{json, Value};

fn ts(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn ts_opt(at: Option<DateTime<Utc>>) -> Value {
    at.map(ts).unwrap_or(Value::Null)
}

/// The logged field-set of a SourceItem.
pub fn source_item_payload(item: &SourceItem) -> Value {
    json!({
        "id": item.id.to_string(),
        "url": item.url,
        "canonical_url": item.canonical_url,
        "publisher": item.publisher,
        "published_at": ts_opt(item.published_at),
        "discovered_at": ts(item.discovered_at),
        "content_type": item.content_type,
        "language": item.language,
        "capture_tier": item.capture_tier,
        "capture_status": item.capture_status,
        "title": item.title,
    })
}

/// The logged field-set of an Artifact.
pub fn artifact_payload(artifact: &Artifact) -> Value {
    json!({
        "id": artifact.id.to_string(),
        "source_item_id": artifact.source_item_id.to_string(),
        "type": artifact.kind.as_str(),
        "storage_uri": artifact.storage_uri,
        "bytes": artifact.bytes,
        "sha256": artifact.sha256,
        "created_at": ts(artifact.created_at),
        "tool_version": artifact.tool_version,
    })
}

/// The logged field-set of an Assessment.
pub fn assessment_payload(assessment: &Assessment) -> Value {
    json!({
        "id": assessment.id.to_string(),
        "claim_id": assessment.claim_id.to_string(),
        "model_version": assessment.model_version,
        "created_at": ts(assessment.created_at),
        "status": assessment.status,
        "score": assessment.score,
        "rationale": assessment.rationale,
        "computed_signals": assessment.computed_signals,
    })
}

/// Hash a payload's canonical form: compact separators, keys sorted.
///
/// `serde_json` maps iterate in key order, so serializing a `Value` object
/// already emits sorted keys with no extraneous whitespace.
pub fn hash_payload(payload: &Value) -> String {
    sha256_hex(payload.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_form_sorts_keys_compactly() {
        let payload = json!({"zebra": 1, "alpha": {"nested_z": true, "nested_a": null}});
        assert_eq!(
            payload.to_string(),
            r#"{"alpha":{"nested_a":null,"nested_z":true},"zebra":1}"#
        );
    }

    #[test]
    fn test_source_item_payload_is_stable() {
        let mut item = SourceItem::new(
            "https://example.org/a",
            Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
        );
        item.title = Some("Title".to_string());

        let first = hash_payload(&source_item_payload(&item));
        let second = hash_payload(&source_item_payload(&item));
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_payload_hash_tracks_content() {
        let base = SourceItem::new(
            "https://example.org/a",
            Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
        );
        let mut changed = base.clone();
        changed.title = Some("New title".to_string());
        assert_ne!(
            hash_payload(&source_item_payload(&base)),
            hash_payload(&source_item_payload(&changed))
        );
    }

    #[test]
    fn test_payload_ignores_unlisted_fields() {
        let base = SourceItem::new(
            "https://example.org/a",
            Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
        );
        let mut changed = base.clone();
        changed.fetch_headers = Some(json!({"etag": "abc"}));
        changed.is_filtered = true;
        assert_eq!(
            hash_payload(&source_item_payload(&base)),
            hash_payload(&source_item_payload(&changed))
        );
    }

    #[test]
    fn test_missing_timestamps_serialize_as_null() {
        let item = SourceItem::new(
            "https://example.org/a",
            Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap(),
        );
        let payload = source_item_payload(&item);
        assert!(payload["published_at"].is_null());
    }
}
