//! Read-side query and review operations
//!
//! The surface the API collaborator consumes: day summaries, event detail,
//! and the human override entry point. "Current" status for display is
//! always the assessment with the latest creation time.

use crate::error::PipelineError;
use factline_domain::ids::AssessmentId;
use factline_domain::{
    ArchiveStore, Assessment, Claim, ClaimId, DateKey, Event, EventId, SourceItem, TruthStatus,
    MODEL_VERSION_HUMAN,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Event count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// The day.
    pub date: DateKey,
    /// Events created for that day.
    pub event_count: u64,
}

/// A claim with its current assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedClaim {
    /// The claim.
    pub claim: Claim,
    /// Its latest assessment.
    pub assessment: Assessment,
}

/// One day's events plus the claims needing review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    /// The day.
    pub date: DateKey,
    /// Events on the day, newest first.
    pub events: Vec<Event>,
    /// Claims on the day whose current status is Unverified or Contested.
    pub review_queue: Vec<AssessedClaim>,
}

/// An event with its members and claims grouped by current status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetail {
    /// The event.
    pub event: Event,
    /// Member SourceItems, in membership order.
    pub sources: Vec<SourceItem>,
    /// Claims keyed by their current status. Claims with no assessment yet
    /// are omitted, matching the scoring pass always running first.
    pub claims_by_status: BTreeMap<String, Vec<AssessedClaim>>,
}

/// A human reviewer's override of a claim's status.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRequest {
    /// Replacement status. Free-form; not limited to the scorer's statuses.
    pub status: String,
    /// Optional replacement score.
    pub score: Option<f64>,
    /// Optional justification lines.
    pub rationale: Option<Vec<String>>,
}

/// Per-day event counts over an inclusive range, zero-filled.
pub fn day_range_summary<S>(
    store: &S,
    start: DateKey,
    end: DateKey,
) -> Result<Vec<DaySummary>, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    if end < start {
        return Err(PipelineError::BadRequest(format!(
            "end {end} must not precede start {start}"
        )));
    }

    let counts: BTreeMap<DateKey, u64> = store
        .event_counts_by_date(&start, &end)
        .map_err(PipelineError::store)?
        .into_iter()
        .collect();

    let mut days = Vec::new();
    let mut cursor = Some(start);
    while let Some(day) = cursor {
        if day > end {
            break;
        }
        days.push(DaySummary {
            date: day,
            event_count: counts.get(&day).copied().unwrap_or(0),
        });
        cursor = day.next();
    }
    Ok(days)
}

fn assessed_claims_for_event<S>(
    store: &S,
    event_id: EventId,
) -> Result<Vec<AssessedClaim>, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let claims = store
        .list_claims_by_event(event_id)
        .map_err(PipelineError::store)?;
    let mut assessed = Vec::new();
    for claim in claims {
        if let Some(assessment) = store
            .latest_assessment_for_claim(claim.id)
            .map_err(PipelineError::store)?
        {
            assessed.push(AssessedClaim { claim, assessment });
        }
    }
    Ok(assessed)
}

/// One day's events (newest first) and its review queue.
pub fn day_detail<S>(store: &S, date: DateKey) -> Result<DayDetail, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let mut events = store
        .list_events_by_date_key(&date)
        .map_err(PipelineError::store)?;
    events.reverse();

    let mut review_queue = Vec::new();
    for event in &events {
        for assessed in assessed_claims_for_event(store, event.id)? {
            let needs_review = matches!(
                TruthStatus::parse(&assessed.assessment.status),
                Some(TruthStatus::Unverified) | Some(TruthStatus::Contested)
            );
            if needs_review {
                review_queue.push(assessed);
            }
        }
    }

    Ok(DayDetail {
        date,
        events,
        review_queue,
    })
}

/// An event with its member sources and claims grouped by current status.
///
/// An unknown event id is a caller error, distinct from a valid event that
/// merely has no claims yet.
pub fn event_detail<S>(store: &S, event_id: EventId) -> Result<EventDetail, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let event = store
        .get_event(event_id)
        .map_err(PipelineError::store)?
        .ok_or_else(|| PipelineError::NotFound {
            entity: "event",
            id: event_id.to_string(),
        })?;

    let memberships = store
        .list_memberships_by_event(event_id)
        .map_err(PipelineError::store)?;
    let mut sources = Vec::new();
    for membership in memberships {
        if let Some(item) = store
            .get_source_item(membership.source_item_id)
            .map_err(PipelineError::store)?
        {
            sources.push(item);
        }
    }

    let mut claims_by_status: BTreeMap<String, Vec<AssessedClaim>> = BTreeMap::new();
    for assessed in assessed_claims_for_event(store, event_id)? {
        claims_by_status
            .entry(assessed.assessment.status.clone())
            .or_default()
            .push(assessed);
    }

    Ok(EventDetail {
        event,
        sources,
        claims_by_status,
    })
}

/// Append a human override assessment for a claim.
///
/// Overrides bypass the automatic pass's once-only rule and always append,
/// becoming the claim's current assessment.
pub fn override_assessment<S>(
    store: &mut S,
    claim_id: ClaimId,
    request: OverrideRequest,
) -> Result<Assessment, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let claim = store
        .get_claim(claim_id)
        .map_err(PipelineError::store)?
        .ok_or_else(|| PipelineError::NotFound {
            entity: "claim",
            id: claim_id.to_string(),
        })?;

    let assessment = Assessment {
        id: AssessmentId::new(),
        claim_id: claim.id,
        model_version: MODEL_VERSION_HUMAN.to_string(),
        created_at: chrono::Utc::now(),
        status: request.status,
        score: request.score,
        rationale: request.rationale.unwrap_or_default(),
        computed_signals: None,
    };
    let inserted = store
        .insert_assessment(assessment)
        .map_err(PipelineError::store)?
        .ok_or_else(|| {
            PipelineError::Store("human assessment rejected by uniqueness constraint".to_string())
        })?;
    info!(claim = %claim.id, status = %inserted.status, "human override recorded");
    Ok(inserted)
}
