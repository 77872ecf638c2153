//! Factline Storage Layer
//!
//! Implements the `ArchiveStore` trait over SQLite. The schema carries the
//! uniqueness constraints the pipeline's idempotency depends on; every
//! insert-or-get method recovers from a constraint violation by re-reading
//! the row the winning writer committed.
//!
//! # Examples
//!
//! ```no_run
//! use factline_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is ready for archive operations
//! ```

#![warn(missing_docs)]

use chrono::{DateTime, SecondsFormat, Utc};
use factline_domain::{
    Artifact, ArtifactKind, Assessment, ArchiveStore, Claim, ClaimAssertion, ClaimId, ClaimType,
    DateKey, Event, EventId, EventMembership, NormalizedText, Polarity, SourceItem, SourceItemId,
    TransparencyLogEntry,
};
use factline_domain::ids::LogEntryId;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found where one was required
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of `ArchiveStore`.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each worker should open its own
/// `SqliteStore` against the shared database file; the schema's constraints
/// keep concurrent writers consistent.
pub struct SqliteStore {
    conn: Connection,
}

const SOURCE_ITEM_COLS: &str = "id, url, canonical_url, title, publisher, published_at, \
     discovered_at, fetch_headers, content_type, language, capture_tier, capture_status, \
     is_significant, is_filtered";

const ARTIFACT_COLS: &str =
    "id, source_item_id, kind, storage_uri, bytes, sha256, created_at, tool_version";

const NORMALIZED_TEXT_COLS: &str =
    "id, source_item_id, canonical_source_item_id, text_hash, normalized_text, created_at";

const EVENT_COLS: &str = "id, title, date_key, created_at, importance_score, tags";

const CLAIM_COLS: &str = "id, event_id, normalized_text, claim_type, entities, numeric_fields";

const ASSERTION_COLS: &str =
    "id, claim_id, source_item_id, extracted_span, excerpt, polarity, assertion_time";

const ASSESSMENT_COLS: &str =
    "id, claim_id, model_version, created_at, status, score, rationale, computed_signals";

const LOG_ENTRY_COLS: &str = "id, previous_root, merkle_root, created_at";

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn ts_to_sql(at: DateTime<Utc>) -> String {
    // Fixed-width fractional seconds keep lexicographic and chronological
    // order identical for range predicates.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conv_err<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn ts_from_sql(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conv_err(idx, e))
}

fn id_from_sql<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| conv_err(idx, e))
}

fn json_from_sql<T: serde::de::DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| conv_err(idx, e))
}

fn json_to_sql<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn row_to_source_item(row: &Row<'_>) -> Result<SourceItem, rusqlite::Error> {
    let id: String = row.get(0)?;
    let published_at: Option<String> = row.get(5)?;
    let discovered_at: String = row.get(6)?;
    let fetch_headers: Option<String> = row.get(7)?;
    Ok(SourceItem {
        id: id_from_sql(0, &id)?,
        url: row.get(1)?,
        canonical_url: row.get(2)?,
        title: row.get(3)?,
        publisher: row.get(4)?,
        published_at: published_at.as_deref().map(|s| ts_from_sql(5, s)).transpose()?,
        discovered_at: ts_from_sql(6, &discovered_at)?,
        fetch_headers: fetch_headers
            .as_deref()
            .map(|s| json_from_sql(7, s))
            .transpose()?,
        content_type: row.get(8)?,
        language: row.get(9)?,
        capture_tier: row.get(10)?,
        capture_status: row.get(11)?,
        is_significant: row.get(12)?,
        is_filtered: row.get(13)?,
    })
}

fn row_to_artifact(row: &Row<'_>) -> Result<Artifact, rusqlite::Error> {
    let id: String = row.get(0)?;
    let source_item_id: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let created_at: String = row.get(6)?;
    Ok(Artifact {
        id: id_from_sql(0, &id)?,
        source_item_id: id_from_sql(1, &source_item_id)?,
        kind: ArtifactKind::parse(&kind).ok_or_else(|| {
            conv_err(2, StoreError::InvalidData(format!("unknown artifact kind: {kind}")))
        })?,
        storage_uri: row.get(3)?,
        bytes: row.get(4)?,
        sha256: row.get(5)?,
        created_at: ts_from_sql(6, &created_at)?,
        tool_version: row.get(7)?,
    })
}

fn row_to_normalized_text(row: &Row<'_>) -> Result<NormalizedText, rusqlite::Error> {
    let id: String = row.get(0)?;
    let source_item_id: String = row.get(1)?;
    let canonical: Option<String> = row.get(2)?;
    let created_at: String = row.get(5)?;
    Ok(NormalizedText {
        id: id_from_sql(0, &id)?,
        source_item_id: id_from_sql(1, &source_item_id)?,
        canonical_source_item_id: canonical
            .as_deref()
            .map(|s| id_from_sql(2, s))
            .transpose()?,
        text_hash: row.get(3)?,
        normalized_text: row.get(4)?,
        created_at: ts_from_sql(5, &created_at)?,
    })
}

fn row_to_event(row: &Row<'_>) -> Result<Event, rusqlite::Error> {
    let id: String = row.get(0)?;
    let date_key: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let tags: Option<String> = row.get(5)?;
    Ok(Event {
        id: id_from_sql(0, &id)?,
        title: row.get(1)?,
        date_key: id_from_sql(2, &date_key)?,
        created_at: ts_from_sql(3, &created_at)?,
        importance_score: row.get(4)?,
        tags: tags.as_deref().map(|s| json_from_sql(5, s)).transpose()?,
    })
}

fn row_to_membership(row: &Row<'_>) -> Result<EventMembership, rusqlite::Error> {
    let event_id: String = row.get(0)?;
    let source_item_id: String = row.get(1)?;
    Ok(EventMembership {
        event_id: id_from_sql(0, &event_id)?,
        source_item_id: id_from_sql(1, &source_item_id)?,
        confidence: row.get(2)?,
    })
}

fn row_to_claim(row: &Row<'_>) -> Result<Claim, rusqlite::Error> {
    let id: String = row.get(0)?;
    let event_id: String = row.get(1)?;
    let claim_type: String = row.get(3)?;
    let entities: Option<String> = row.get(4)?;
    let numeric_fields: Option<String> = row.get(5)?;
    Ok(Claim {
        id: id_from_sql(0, &id)?,
        event_id: id_from_sql(1, &event_id)?,
        normalized_text: row.get(2)?,
        claim_type: ClaimType::parse(&claim_type).ok_or_else(|| {
            conv_err(3, StoreError::InvalidData(format!("unknown claim type: {claim_type}")))
        })?,
        entities: entities.as_deref().map(|s| json_from_sql(4, s)).transpose()?,
        numeric_fields: numeric_fields
            .as_deref()
            .map(|s| json_from_sql(5, s))
            .transpose()?,
    })
}

fn row_to_assertion(row: &Row<'_>) -> Result<ClaimAssertion, rusqlite::Error> {
    let id: String = row.get(0)?;
    let claim_id: String = row.get(1)?;
    let source_item_id: String = row.get(2)?;
    let polarity: String = row.get(5)?;
    let assertion_time: Option<String> = row.get(6)?;
    Ok(ClaimAssertion {
        id: id_from_sql(0, &id)?,
        claim_id: id_from_sql(1, &claim_id)?,
        source_item_id: id_from_sql(2, &source_item_id)?,
        extracted_span: row.get(3)?,
        excerpt: row.get(4)?,
        polarity: Polarity::parse(&polarity).ok_or_else(|| {
            conv_err(5, StoreError::InvalidData(format!("unknown polarity: {polarity}")))
        })?,
        assertion_time: assertion_time
            .as_deref()
            .map(|s| ts_from_sql(6, s))
            .transpose()?,
    })
}

fn row_to_assessment(row: &Row<'_>) -> Result<Assessment, rusqlite::Error> {
    let id: String = row.get(0)?;
    let claim_id: String = row.get(1)?;
    let created_at: String = row.get(3)?;
    let rationale: Option<String> = row.get(6)?;
    let signals: Option<String> = row.get(7)?;
    Ok(Assessment {
        id: id_from_sql(0, &id)?,
        claim_id: id_from_sql(1, &claim_id)?,
        model_version: row.get(2)?,
        created_at: ts_from_sql(3, &created_at)?,
        status: row.get(4)?,
        score: row.get(5)?,
        rationale: rationale
            .as_deref()
            .map(|s| json_from_sql(6, s))
            .transpose()?
            .unwrap_or_default(),
        computed_signals: signals.as_deref().map(|s| json_from_sql(7, s)).transpose()?,
    })
}

fn row_to_log_entry(row: &Row<'_>) -> Result<TransparencyLogEntry, rusqlite::Error> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(3)?;
    Ok(TransparencyLogEntry {
        id: id_from_sql(0, &id)?,
        previous_root: row.get(1)?,
        merkle_root: row.get(2)?,
        created_at: ts_from_sql(3, &created_at)?,
    })
}

impl SqliteStore {
    fn select_membership(
        &self,
        source_item_id: SourceItemId,
    ) -> Result<Option<EventMembership>, StoreError> {
        let membership = self
            .conn
            .query_row(
                "SELECT event_id, source_item_id, confidence FROM event_memberships \
                 WHERE source_item_id = ?1",
                params![source_item_id.to_string()],
                row_to_membership,
            )
            .optional()?;
        Ok(membership)
    }
}

impl ArchiveStore for SqliteStore {
    type Error = StoreError;

    fn insert_source_item(&mut self, item: SourceItem) -> Result<SourceItem, Self::Error> {
        let fetch_headers = item
            .fetch_headers
            .as_ref()
            .map(json_to_sql)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO source_items (id, url, canonical_url, title, publisher, published_at, \
             discovered_at, fetch_headers, content_type, language, capture_tier, capture_status, \
             is_significant, is_filtered) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                item.id.to_string(),
                item.url,
                item.canonical_url,
                item.title,
                item.publisher,
                item.published_at.map(ts_to_sql),
                ts_to_sql(item.discovered_at),
                fetch_headers,
                item.content_type,
                item.language,
                item.capture_tier,
                item.capture_status,
                item.is_significant,
                item.is_filtered,
            ],
        )?;
        Ok(item)
    }

    fn get_source_item(&self, id: SourceItemId) -> Result<Option<SourceItem>, Self::Error> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {SOURCE_ITEM_COLS} FROM source_items WHERE id = ?1"),
                params![id.to_string()],
                row_to_source_item,
            )
            .optional()?;
        Ok(item)
    }

    fn update_source_item(&mut self, item: &SourceItem) -> Result<(), Self::Error> {
        let fetch_headers = item
            .fetch_headers
            .as_ref()
            .map(json_to_sql)
            .transpose()?;
        let changed = self.conn.execute(
            "UPDATE source_items SET url = ?2, canonical_url = ?3, title = ?4, publisher = ?5, \
             published_at = ?6, discovered_at = ?7, fetch_headers = ?8, content_type = ?9, \
             language = ?10, capture_tier = ?11, capture_status = ?12, is_significant = ?13, \
             is_filtered = ?14 WHERE id = ?1",
            params![
                item.id.to_string(),
                item.url,
                item.canonical_url,
                item.title,
                item.publisher,
                item.published_at.map(ts_to_sql),
                ts_to_sql(item.discovered_at),
                fetch_headers,
                item.content_type,
                item.language,
                item.capture_tier,
                item.capture_status,
                item.is_significant,
                item.is_filtered,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("source item {}", item.id)));
        }
        Ok(())
    }

    fn list_source_items_by_capture_status(
        &self,
        status: &str,
    ) -> Result<Vec<SourceItem>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOURCE_ITEM_COLS} FROM source_items WHERE capture_status = ?1 \
             ORDER BY rowid"
        ))?;
        let items = stmt
            .query_map(params![status], row_to_source_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_unclustered_source_items(&self) -> Result<Vec<SourceItem>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOURCE_ITEM_COLS} FROM source_items \
             WHERE is_filtered = 0 \
               AND id NOT IN (SELECT source_item_id FROM event_memberships) \
             ORDER BY rowid"
        ))?;
        let items = stmt
            .query_map([], row_to_source_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_source_items_discovered_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<SourceItem>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOURCE_ITEM_COLS} FROM source_items \
             WHERE is_filtered = 0 AND discovered_at >= ?1 ORDER BY rowid"
        ))?;
        let items = stmt
            .query_map(params![ts_to_sql(cutoff)], row_to_source_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_source_items_discovered_on(
        &self,
        date_key: &DateKey,
    ) -> Result<Vec<SourceItem>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOURCE_ITEM_COLS} FROM source_items \
             WHERE substr(discovered_at, 1, 10) = ?1 ORDER BY rowid"
        ))?;
        let items = stmt
            .query_map(params![date_key.to_string()], row_to_source_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn insert_artifact(&mut self, artifact: Artifact) -> Result<Artifact, Self::Error> {
        self.conn.execute(
            "INSERT INTO artifacts (id, source_item_id, kind, storage_uri, bytes, sha256, \
             created_at, tool_version) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                artifact.id.to_string(),
                artifact.source_item_id.to_string(),
                artifact.kind.as_str(),
                artifact.storage_uri,
                artifact.bytes,
                artifact.sha256,
                ts_to_sql(artifact.created_at),
                artifact.tool_version,
            ],
        )?;
        Ok(artifact)
    }

    fn find_artifact(
        &self,
        source_item_id: SourceItemId,
        kind: ArtifactKind,
    ) -> Result<Option<Artifact>, Self::Error> {
        let artifact = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ARTIFACT_COLS} FROM artifacts \
                     WHERE source_item_id = ?1 AND kind = ?2 ORDER BY rowid LIMIT 1"
                ),
                params![source_item_id.to_string(), kind.as_str()],
                row_to_artifact,
            )
            .optional()?;
        Ok(artifact)
    }

    fn list_artifacts_created_on(&self, date_key: &DateKey) -> Result<Vec<Artifact>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTIFACT_COLS} FROM artifacts \
             WHERE substr(created_at, 1, 10) = ?1 ORDER BY rowid"
        ))?;
        let artifacts = stmt
            .query_map(params![date_key.to_string()], row_to_artifact)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artifacts)
    }

    fn insert_normalized_text(
        &mut self,
        record: NormalizedText,
    ) -> Result<NormalizedText, Self::Error> {
        let result = self.conn.execute(
            "INSERT INTO normalized_texts (id, source_item_id, canonical_source_item_id, \
             text_hash, normalized_text, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id.to_string(),
                record.source_item_id.to_string(),
                record.canonical_source_item_id.map(|id| id.to_string()),
                record.text_hash,
                record.normalized_text,
                ts_to_sql(record.created_at),
            ],
        );
        match result {
            Ok(_) => Ok(record),
            Err(e) if is_unique_violation(&e) => self
                .get_normalized_text(record.source_item_id)?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "normalized text for {} after unique violation",
                        record.source_item_id
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }

    fn get_normalized_text(
        &self,
        source_item_id: SourceItemId,
    ) -> Result<Option<NormalizedText>, Self::Error> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {NORMALIZED_TEXT_COLS} FROM normalized_texts \
                     WHERE source_item_id = ?1"
                ),
                params![source_item_id.to_string()],
                row_to_normalized_text,
            )
            .optional()?;
        Ok(record)
    }

    fn find_normalized_text_by_hash(
        &self,
        text_hash: &str,
    ) -> Result<Option<NormalizedText>, Self::Error> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {NORMALIZED_TEXT_COLS} FROM normalized_texts \
                     WHERE text_hash = ?1 ORDER BY created_at, rowid LIMIT 1"
                ),
                params![text_hash],
                row_to_normalized_text,
            )
            .optional()?;
        Ok(record)
    }

    fn list_normalized_texts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<NormalizedText>, Self::Error> {
        let sql = match limit {
            Some(n) => format!(
                "SELECT {NORMALIZED_TEXT_COLS} FROM normalized_texts ORDER BY rowid LIMIT {n}"
            ),
            None => format!("SELECT {NORMALIZED_TEXT_COLS} FROM normalized_texts ORDER BY rowid"),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], row_to_normalized_text)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get_event(&self, id: EventId) -> Result<Option<Event>, Self::Error> {
        let event = self
            .conn
            .query_row(
                &format!("SELECT {EVENT_COLS} FROM events WHERE id = ?1"),
                params![id.to_string()],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    fn list_events_by_date_key(&self, date_key: &DateKey) -> Result<Vec<Event>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM events WHERE date_key = ?1 ORDER BY created_at, rowid"
        ))?;
        let events = stmt
            .query_map(params![date_key.to_string()], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn event_counts_by_date(
        &self,
        start: &DateKey,
        end: &DateKey,
    ) -> Result<Vec<(DateKey, u64)>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT date_key, COUNT(*) FROM events \
             WHERE date_key >= ?1 AND date_key <= ?2 GROUP BY date_key ORDER BY date_key",
        )?;
        let counts = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                let key: String = row.get(0)?;
                Ok((id_from_sql(0, &key)?, row.get::<_, u64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn get_membership(
        &self,
        source_item_id: SourceItemId,
    ) -> Result<Option<EventMembership>, Self::Error> {
        self.select_membership(source_item_id)
    }

    fn insert_membership(
        &mut self,
        membership: EventMembership,
    ) -> Result<EventMembership, Self::Error> {
        let result = self.conn.execute(
            "INSERT INTO event_memberships (event_id, source_item_id, confidence) \
             VALUES (?1, ?2, ?3)",
            params![
                membership.event_id.to_string(),
                membership.source_item_id.to_string(),
                membership.confidence,
            ],
        );
        match result {
            Ok(_) => Ok(membership),
            Err(e) if is_unique_violation(&e) => self
                .select_membership(membership.source_item_id)?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "membership for {} after unique violation",
                        membership.source_item_id
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_event_with_membership(
        &mut self,
        event: Event,
        membership: EventMembership,
    ) -> Result<EventMembership, Self::Error> {
        let tags = event.tags.as_ref().map(json_to_sql).transpose()?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO events (id, title, date_key, created_at, importance_score, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id.to_string(),
                event.title,
                event.date_key.to_string(),
                ts_to_sql(event.created_at),
                event.importance_score,
                tags,
            ],
        )?;
        let result = tx.execute(
            "INSERT INTO event_memberships (event_id, source_item_id, confidence) \
             VALUES (?1, ?2, ?3)",
            params![
                membership.event_id.to_string(),
                membership.source_item_id.to_string(),
                membership.confidence,
            ],
        );
        match result {
            Ok(_) => {
                tx.commit()?;
                Ok(membership)
            }
            // A concurrent worker already clustered the item; roll the event
            // back and return the committed membership.
            Err(e) if is_unique_violation(&e) => {
                drop(tx);
                self.select_membership(membership.source_item_id)?
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "membership for {} after unique violation",
                            membership.source_item_id
                        ))
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_memberships_by_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<EventMembership>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, source_item_id, confidence FROM event_memberships \
             WHERE event_id = ?1 ORDER BY rowid",
        )?;
        let memberships = stmt
            .query_map(params![event_id.to_string()], row_to_membership)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(memberships)
    }

    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error> {
        let claim = self
            .conn
            .query_row(
                &format!("SELECT {CLAIM_COLS} FROM claims WHERE id = ?1"),
                params![id.to_string()],
                row_to_claim,
            )
            .optional()?;
        Ok(claim)
    }

    fn insert_claim(&mut self, claim: Claim) -> Result<Claim, Self::Error> {
        let entities = claim.entities.as_ref().map(json_to_sql).transpose()?;
        let numeric_fields = claim.numeric_fields.as_ref().map(json_to_sql).transpose()?;
        let result = self.conn.execute(
            "INSERT INTO claims (id, event_id, normalized_text, claim_type, entities, \
             numeric_fields) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                claim.id.to_string(),
                claim.event_id.to_string(),
                claim.normalized_text,
                claim.claim_type.as_str(),
                entities,
                numeric_fields,
            ],
        );
        match result {
            Ok(_) => Ok(claim),
            Err(e) if is_unique_violation(&e) => self
                .find_claim(claim.event_id, &claim.normalized_text, claim.claim_type)?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "claim for event {} after unique violation",
                        claim.event_id
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }

    fn find_claim(
        &self,
        event_id: EventId,
        normalized_text: &str,
        claim_type: ClaimType,
    ) -> Result<Option<Claim>, Self::Error> {
        let claim = self
            .conn
            .query_row(
                &format!(
                    "SELECT {CLAIM_COLS} FROM claims \
                     WHERE event_id = ?1 AND normalized_text = ?2 AND claim_type = ?3"
                ),
                params![event_id.to_string(), normalized_text, claim_type.as_str()],
                row_to_claim,
            )
            .optional()?;
        Ok(claim)
    }

    fn list_claims_by_event(&self, event_id: EventId) -> Result<Vec<Claim>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLAIM_COLS} FROM claims WHERE event_id = ?1 ORDER BY rowid"
        ))?;
        let claims = stmt
            .query_map(params![event_id.to_string()], row_to_claim)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }

    fn insert_assertion(
        &mut self,
        assertion: ClaimAssertion,
    ) -> Result<ClaimAssertion, Self::Error> {
        let result = self.conn.execute(
            "INSERT INTO claim_assertions (id, claim_id, source_item_id, extracted_span, \
             excerpt, polarity, assertion_time) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                assertion.id.to_string(),
                assertion.claim_id.to_string(),
                assertion.source_item_id.to_string(),
                assertion.extracted_span,
                assertion.excerpt,
                assertion.polarity.as_str(),
                assertion.assertion_time.map(ts_to_sql),
            ],
        );
        match result {
            Ok(_) => Ok(assertion),
            Err(e) if is_unique_violation(&e) => {
                let existing = self
                    .conn
                    .query_row(
                        &format!(
                            "SELECT {ASSERTION_COLS} FROM claim_assertions \
                             WHERE claim_id = ?1 AND source_item_id = ?2"
                        ),
                        params![
                            assertion.claim_id.to_string(),
                            assertion.source_item_id.to_string()
                        ],
                        row_to_assertion,
                    )
                    .optional()?;
                existing.ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "assertion for claim {} after unique violation",
                        assertion.claim_id
                    ))
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_assertions_by_claim(
        &self,
        claim_id: ClaimId,
    ) -> Result<Vec<ClaimAssertion>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ASSERTION_COLS} FROM claim_assertions WHERE claim_id = ?1 ORDER BY rowid"
        ))?;
        let assertions = stmt
            .query_map(params![claim_id.to_string()], row_to_assertion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assertions)
    }

    fn publishers_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Option<String>>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT s.publisher FROM source_items s \
             JOIN claim_assertions a ON a.source_item_id = s.id \
             WHERE a.claim_id = ?1 ORDER BY a.rowid",
        )?;
        let publishers = stmt
            .query_map(params![claim_id.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(publishers)
    }

    fn has_assessment(&self, claim_id: ClaimId) -> Result<bool, Self::Error> {
        let exists: Option<bool> = self
            .conn
            .query_row(
                "SELECT 1 FROM assessments WHERE claim_id = ?1 LIMIT 1",
                params![claim_id.to_string()],
                |_| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }

    fn insert_assessment(
        &mut self,
        assessment: Assessment,
    ) -> Result<Option<Assessment>, Self::Error> {
        let rationale = json_to_sql(&assessment.rationale)?;
        let signals = assessment
            .computed_signals
            .as_ref()
            .map(json_to_sql)
            .transpose()?;
        let result = self.conn.execute(
            "INSERT INTO assessments (id, claim_id, model_version, created_at, status, score, \
             rationale, computed_signals) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                assessment.id.to_string(),
                assessment.claim_id.to_string(),
                assessment.model_version,
                ts_to_sql(assessment.created_at),
                assessment.status,
                assessment.score,
                rationale,
                signals,
            ],
        );
        match result {
            Ok(_) => Ok(Some(assessment)),
            // The partial unique index rejected a second v1 row: the first
            // automatic assessment won.
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn latest_assessment_for_claim(
        &self,
        claim_id: ClaimId,
    ) -> Result<Option<Assessment>, Self::Error> {
        let assessment = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ASSESSMENT_COLS} FROM assessments WHERE claim_id = ?1 \
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                params![claim_id.to_string()],
                row_to_assessment,
            )
            .optional()?;
        Ok(assessment)
    }

    fn list_assessments_created_on(
        &self,
        date_key: &DateKey,
    ) -> Result<Vec<Assessment>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ASSESSMENT_COLS} FROM assessments \
             WHERE substr(created_at, 1, 10) = ?1 ORDER BY rowid"
        ))?;
        let assessments = stmt
            .query_map(params![date_key.to_string()], row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assessments)
    }

    fn latest_log_entry(&self) -> Result<Option<TransparencyLogEntry>, Self::Error> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "SELECT {LOG_ENTRY_COLS} FROM transparency_log_entries \
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                [],
                row_to_log_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn append_log_entry(
        &mut self,
        merkle_root: String,
        created_at: DateTime<Utc>,
    ) -> Result<TransparencyLogEntry, Self::Error> {
        // Immediate transaction: the previous-root read and the insert hold
        // the write lock together, so appends cannot interleave.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let previous_root: Option<String> = tx
            .query_row(
                "SELECT merkle_root FROM transparency_log_entries \
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let entry = TransparencyLogEntry {
            id: LogEntryId::new(),
            previous_root,
            merkle_root,
            created_at,
        };
        tx.execute(
            "INSERT INTO transparency_log_entries (id, previous_root, merkle_root, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id.to_string(),
                entry.previous_root,
                entry.merkle_root,
                ts_to_sql(entry.created_at),
            ],
        )?;
        tx.commit()?;
        Ok(entry)
    }

    fn list_log_entries(&self) -> Result<Vec<TransparencyLogEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_ENTRY_COLS} FROM transparency_log_entries ORDER BY created_at, rowid"
        ))?;
        let entries = stmt
            .query_map([], row_to_log_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
