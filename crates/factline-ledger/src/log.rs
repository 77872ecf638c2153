//! Daily snapshot roots and the hash chain

use crate::canonical::{artifact_payload, assessment_payload, hash_payload, source_item_payload};
use crate::error::LedgerError;
use crate::merkle::merkle_root;
use factline_domain::{ArchiveStore, DateKey, TransparencyLogEntry};
use tracing::info;

/// Leaf hashes for one UTC day's snapshot.
///
/// SourceItems (by discovery day), Artifacts and Assessments (by creation
/// day) are hashed individually; each of the three lists is sorted
/// lexicographically, then they are concatenated in that fixed order. The
/// sort makes the root invariant to insertion order within a day.
pub fn daily_leaf_hashes<S>(store: &S, date_key: &DateKey) -> Result<Vec<String>, LedgerError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let mut item_hashes: Vec<String> = store
        .list_source_items_discovered_on(date_key)
        .map_err(LedgerError::store)?
        .iter()
        .map(|item| hash_payload(&source_item_payload(item)))
        .collect();
    item_hashes.sort();

    let mut artifact_hashes: Vec<String> = store
        .list_artifacts_created_on(date_key)
        .map_err(LedgerError::store)?
        .iter()
        .map(|artifact| hash_payload(&artifact_payload(artifact)))
        .collect();
    artifact_hashes.sort();

    let mut assessment_hashes: Vec<String> = store
        .list_assessments_created_on(date_key)
        .map_err(LedgerError::store)?
        .iter()
        .map(|assessment| hash_payload(&assessment_payload(assessment)))
        .collect();
    assessment_hashes.sort();

    let mut leaves = item_hashes;
    leaves.append(&mut artifact_hashes);
    leaves.append(&mut assessment_hashes);
    Ok(leaves)
}

/// The Merkle root of one day's snapshot.
pub fn compute_daily_root<S>(store: &S, date_key: &DateKey) -> Result<String, LedgerError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let leaves = daily_leaf_hashes(store, date_key)?;
    Ok(merkle_root(&leaves))
}

/// Append a chain entry for one day's snapshot.
///
/// The new entry links to the most recently created entry, whatever its
/// date. Re-running for an already-logged date therefore appends a second,
/// different link rather than no-oping; verifiers see every append. Appends
/// must be owned by a single writer.
pub fn append_daily_entry<S>(
    store: &mut S,
    date_key: &DateKey,
) -> Result<TransparencyLogEntry, LedgerError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let root = compute_daily_root(store, date_key)?;
    let entry = store
        .append_log_entry(root, chrono::Utc::now())
        .map_err(LedgerError::store)?;
    info!(
        date = %date_key,
        root = %entry.merkle_root,
        previous = entry.previous_root.as_deref().unwrap_or("genesis"),
        "transparency log entry appended"
    );
    Ok(entry)
}

/// Verify that a sequence of entries, oldest to newest, links correctly.
///
/// The genesis entry must carry no previous root; every later entry must
/// carry exactly the preceding entry's Merkle root.
pub fn verify_entries(entries: &[TransparencyLogEntry]) -> Result<usize, LedgerError> {
    let mut expected: Option<String> = None;
    for (index, entry) in entries.iter().enumerate() {
        if entry.previous_root != expected {
            return Err(LedgerError::ChainBroken {
                index,
                expected,
                found: entry.previous_root.clone(),
            });
        }
        expected = Some(entry.merkle_root.clone());
    }
    Ok(entries.len())
}

/// Verify the whole stored chain; returns the number of entries checked.
pub fn verify_chain<S>(store: &S) -> Result<usize, LedgerError>
where
    S: ArchiveStore,
    S::Error: std::fmt::Display,
{
    let entries = store.list_log_entries().map_err(LedgerError::store)?;
    verify_entries(&entries)
}
