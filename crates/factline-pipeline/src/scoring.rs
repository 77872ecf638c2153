//! Signal aggregation and truth-status scoring

use crate::error::PipelineError;
use factline_domain::ids::AssessmentId;
use factline_domain::{
    ArchiveStore, Assessment, Claim, ClaimId, Polarity, Signals, TruthStatus, MODEL_VERSION_V1,
};
use tracing::debug;

/// Aggregate the evidence signals for a claim.
///
/// `independent_sources_count` counts distinct non-null publishers across
/// the claim's asserting SourceItems; `contradiction_count` counts `denies`
/// assertions. The reserved signals stay false in the v1 rule set.
pub fn compute_signals<S>(store: &S, claim_id: ClaimId) -> Result<Signals, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let publishers = store
        .publishers_for_claim(claim_id)
        .map_err(PipelineError::store)?;
    let mut distinct: Vec<String> = publishers.into_iter().flatten().collect();
    distinct.sort();
    distinct.dedup();

    let assertions = store
        .list_assertions_by_claim(claim_id)
        .map_err(PipelineError::store)?;
    let contradiction_count = assertions
        .iter()
        .filter(|a| a.polarity == Polarity::Denies)
        .count() as u64;

    Ok(Signals {
        independent_sources_count: distinct.len() as u64,
        contradiction_count,
        primary_evidence_present: false,
        correction_seen: false,
    })
}

/// Derive a status and its fixed score from signals.
///
/// Evaluated in strict priority order: any contradiction wins, then
/// corroboration, then the unverified fallback. Scores are constants tied
/// to the status, not a function of the counts.
pub fn derive_status(signals: &Signals) -> (TruthStatus, f64) {
    if signals.contradiction_count >= 1 {
        return (TruthStatus::Contested, 0.3);
    }
    if signals.independent_sources_count >= 2 && !signals.primary_evidence_present {
        return (TruthStatus::Corroborated, 0.7);
    }
    (TruthStatus::Unverified, 0.2)
}

/// Human-readable justification lines for a signal set.
pub fn rationale(signals: &Signals) -> Vec<String> {
    let mut bullets = vec![format!(
        "Independent sources: {}",
        signals.independent_sources_count
    )];
    if signals.contradiction_count >= 1 {
        bullets.push(format!("Contradictions: {}", signals.contradiction_count));
    }
    if !signals.primary_evidence_present {
        bullets.push("No primary evidence detected".to_string());
    }
    bullets
}

/// Run the automatic v1 scoring pass for a claim, once.
///
/// Returns `None` when any assessment already exists, including when a
/// concurrent worker wins the insert race, which the store's partial unique
/// index converts into a quiet no-op. First write wins; re-scoring never
/// overwrites history.
pub fn create_assessment_if_missing<S>(
    store: &mut S,
    claim: &Claim,
) -> Result<Option<Assessment>, PipelineError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    if store
        .has_assessment(claim.id)
        .map_err(PipelineError::store)?
    {
        return Ok(None);
    }

    let signals = compute_signals(store, claim.id)?;
    let (status, score) = derive_status(&signals);
    debug!(claim = %claim.id, status = %status, score, "scored claim");

    let assessment = Assessment {
        id: AssessmentId::new(),
        claim_id: claim.id,
        model_version: MODEL_VERSION_V1.to_string(),
        created_at: chrono::Utc::now(),
        status: status.as_str().to_string(),
        score: Some(score),
        rationale: rationale(&signals),
        computed_signals: Some(signals),
    };
    store
        .insert_assessment(assessment)
        .map_err(PipelineError::store)
}
