//! The storage seam between domain logic and infrastructure
//!
//! The pipeline and ledger are generic over `ArchiveStore`; the concrete
//! implementation lives in the storage crate. Components receive the store
//! explicitly; there is no ambient connection or session state.
//!
//! Every `insert_*` that targets a uniqueness constraint is an
//! **insert-or-get**: under concurrent callers, a constraint violation is
//! recovered by re-reading and returning the already-committed row, so the
//! operation is idempotent even though the caller's check-then-insert is
//! not.

use crate::artifact::{Artifact, ArtifactKind};
use crate::assessment::Assessment;
use crate::claim::{Claim, ClaimAssertion, ClaimType};
use crate::date_key::DateKey;
use crate::event::{Event, EventMembership};
use crate::ids::{ClaimId, EventId, SourceItemId};
use crate::ledger::TransparencyLogEntry;
use crate::source_item::{NormalizedText, SourceItem};
use chrono::{DateTime, Utc};

/// Storage operations for the archive.
///
/// Read methods take `&self`; writes take `&mut self`. All list methods
/// return rows in a stable order (documented per method) so the pipeline's
/// tie-breaking rules are deterministic.
pub trait ArchiveStore {
    /// Error type for store operations.
    type Error;

    // --- source items ---

    /// Insert a new SourceItem.
    fn insert_source_item(&mut self, item: SourceItem) -> Result<SourceItem, Self::Error>;

    /// Get a SourceItem by id.
    fn get_source_item(&self, id: SourceItemId) -> Result<Option<SourceItem>, Self::Error>;

    /// Persist mutated SourceItem fields (capture status, filter flags).
    fn update_source_item(&mut self, item: &SourceItem) -> Result<(), Self::Error>;

    /// SourceItems with the given capture status, in insertion order.
    fn list_source_items_by_capture_status(
        &self,
        status: &str,
    ) -> Result<Vec<SourceItem>, Self::Error>;

    /// Unfiltered SourceItems with no event membership, in insertion order.
    fn list_unclustered_source_items(&self) -> Result<Vec<SourceItem>, Self::Error>;

    /// Unfiltered SourceItems discovered at or after `cutoff`.
    fn list_source_items_discovered_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<SourceItem>, Self::Error>;

    /// SourceItems discovered on the given UTC day, in insertion order.
    fn list_source_items_discovered_on(
        &self,
        date_key: &DateKey,
    ) -> Result<Vec<SourceItem>, Self::Error>;

    // --- artifacts ---

    /// Insert a new Artifact.
    fn insert_artifact(&mut self, artifact: Artifact) -> Result<Artifact, Self::Error>;

    /// The first artifact of the given kind for a SourceItem, if any.
    fn find_artifact(
        &self,
        source_item_id: SourceItemId,
        kind: ArtifactKind,
    ) -> Result<Option<Artifact>, Self::Error>;

    /// Artifacts created on the given UTC day, in insertion order.
    fn list_artifacts_created_on(&self, date_key: &DateKey) -> Result<Vec<Artifact>, Self::Error>;

    // --- normalized texts (dedup ledger) ---

    /// Insert-or-get against the unique index on `source_item_id`.
    fn insert_normalized_text(
        &mut self,
        record: NormalizedText,
    ) -> Result<NormalizedText, Self::Error>;

    /// The normalized text for a SourceItem, if recorded.
    fn get_normalized_text(
        &self,
        source_item_id: SourceItemId,
    ) -> Result<Option<NormalizedText>, Self::Error>;

    /// The earliest-created record with the given content hash (first-seen
    /// wins; lookup order is insertion order of creation).
    fn find_normalized_text_by_hash(
        &self,
        text_hash: &str,
    ) -> Result<Option<NormalizedText>, Self::Error>;

    /// Normalized texts in insertion order, optionally limited.
    fn list_normalized_texts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<NormalizedText>, Self::Error>;

    // --- events and memberships ---

    /// Get an Event by id.
    fn get_event(&self, id: EventId) -> Result<Option<Event>, Self::Error>;

    /// Events on the given day, in creation order (oldest first). The
    /// clusterer's tie-breaking depends on this order being stable.
    fn list_events_by_date_key(&self, date_key: &DateKey) -> Result<Vec<Event>, Self::Error>;

    /// Event counts per day across an inclusive range, ascending by day.
    /// Days with no events are absent from the result.
    fn event_counts_by_date(
        &self,
        start: &DateKey,
        end: &DateKey,
    ) -> Result<Vec<(DateKey, u64)>, Self::Error>;

    /// The membership for a SourceItem, if clustered.
    fn get_membership(
        &self,
        source_item_id: SourceItemId,
    ) -> Result<Option<EventMembership>, Self::Error>;

    /// Insert-or-get against the unique index on `source_item_id`.
    fn insert_membership(
        &mut self,
        membership: EventMembership,
    ) -> Result<EventMembership, Self::Error>;

    /// Create an Event and its first membership in one transaction, so a
    /// failure cannot leave an event without members. Insert-or-get on the
    /// membership's unique index.
    fn insert_event_with_membership(
        &mut self,
        event: Event,
        membership: EventMembership,
    ) -> Result<EventMembership, Self::Error>;

    /// Memberships of an event, in insertion order.
    fn list_memberships_by_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<EventMembership>, Self::Error>;

    // --- claims and assertions ---

    /// Get a Claim by id.
    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error>;

    /// Insert-or-get against the unique key (event, normalized_text, type).
    fn insert_claim(&mut self, claim: Claim) -> Result<Claim, Self::Error>;

    /// The claim with the given unique key, if present.
    fn find_claim(
        &self,
        event_id: EventId,
        normalized_text: &str,
        claim_type: ClaimType,
    ) -> Result<Option<Claim>, Self::Error>;

    /// Claims scoped to an event, in insertion order.
    fn list_claims_by_event(&self, event_id: EventId) -> Result<Vec<Claim>, Self::Error>;

    /// Insert-or-get against the unique key (claim, source item).
    fn insert_assertion(
        &mut self,
        assertion: ClaimAssertion,
    ) -> Result<ClaimAssertion, Self::Error>;

    /// Assertions on a claim, in insertion order.
    fn list_assertions_by_claim(
        &self,
        claim_id: ClaimId,
    ) -> Result<Vec<ClaimAssertion>, Self::Error>;

    /// Publishers of the SourceItems asserting a claim, one per assertion,
    /// `None` where the source has no publisher.
    fn publishers_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Option<String>>, Self::Error>;

    // --- assessments ---

    /// Whether any assessment exists for a claim.
    fn has_assessment(&self, claim_id: ClaimId) -> Result<bool, Self::Error>;

    /// Insert an assessment. Returns `None` when the partial unique index
    /// rejects a second v1 row for the claim (the first write won); human
    /// rows always insert.
    fn insert_assessment(
        &mut self,
        assessment: Assessment,
    ) -> Result<Option<Assessment>, Self::Error>;

    /// The assessment with the latest creation time for a claim, insertion
    /// order breaking ties.
    fn latest_assessment_for_claim(
        &self,
        claim_id: ClaimId,
    ) -> Result<Option<Assessment>, Self::Error>;

    /// Assessments created on the given UTC day, in insertion order.
    fn list_assessments_created_on(
        &self,
        date_key: &DateKey,
    ) -> Result<Vec<Assessment>, Self::Error>;

    // --- transparency log ---

    /// The most recently created chain entry, insertion order breaking ties.
    fn latest_log_entry(&self) -> Result<Option<TransparencyLogEntry>, Self::Error>;

    /// Append a chain entry linking to the latest entry's root. The read of
    /// the previous root and the insert happen in one write transaction;
    /// appends must additionally be owned by a single writer, because the
    /// chain links by creation time.
    fn append_log_entry(
        &mut self,
        merkle_root: String,
        created_at: DateTime<Utc>,
    ) -> Result<TransparencyLogEntry, Self::Error>;

    /// All chain entries, oldest first (creation order).
    fn list_log_entries(&self) -> Result<Vec<TransparencyLogEntry>, Self::Error>;
}
