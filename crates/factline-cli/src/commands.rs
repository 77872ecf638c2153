//! Command implementations.

use crate::cli::{ClaimsArgs, DaysArgs, EventArgs, FilterArgs, LogArgs};
use crate::config::FactlineConfig;
use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use factline_domain::{DateKey, EventId};
use factline_pipeline::PipelineError;
use factline_store::SqliteStore;

fn parse_date_key(raw: &str) -> anyhow::Result<DateKey> {
    raw.parse()
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

pub fn normalize(store: &mut SqliteStore) -> anyhow::Result<()> {
    let processed = factline_pipeline::process::normalize_captured(store)?;
    println!("normalized {processed} captured items");
    Ok(())
}

pub fn cluster(store: &mut SqliteStore, config: &FactlineConfig) -> anyhow::Result<()> {
    let processed = factline_pipeline::process::cluster_pending(store, &config.cluster)?;
    println!("clustered {processed} items");
    Ok(())
}

pub fn claims(store: &mut SqliteStore, args: ClaimsArgs) -> anyhow::Result<()> {
    let processed = factline_pipeline::process::extract_and_score(store, args.limit)?;
    println!("extracted and scored claims from {processed} normalized texts");
    Ok(())
}

pub fn filter(
    store: &mut SqliteStore,
    config: &FactlineConfig,
    args: FilterArgs,
) -> anyhow::Result<()> {
    let cutoff = Utc::now() - Duration::hours(args.hours);
    let filtered = factline_pipeline::significance::filter_insignificant(
        store,
        cutoff,
        &config.significance,
        args.dry_run,
    )?;
    if args.dry_run {
        println!("dry run: would filter {filtered} items");
    } else {
        println!("filtered {filtered} items");
    }
    Ok(())
}

pub fn log(store: &mut SqliteStore, args: LogArgs) -> anyhow::Result<()> {
    let date_key = match args.date.as_deref() {
        Some(raw) => parse_date_key(raw)?,
        None => DateKey::from_datetime(Utc::now()),
    };
    let entry = factline_ledger::append_daily_entry(store, &date_key)?;
    println!("appended log root: {}", entry.merkle_root);
    Ok(())
}

pub fn verify(store: &SqliteStore) -> anyhow::Result<()> {
    let checked = factline_ledger::verify_chain(store)?;
    println!("chain intact: {checked} entries verified");
    Ok(())
}

pub fn days(store: &SqliteStore, args: DaysArgs) -> anyhow::Result<()> {
    let start = parse_date_key(&args.start)?;
    let end = parse_date_key(&args.end)?;
    let summary = factline_pipeline::day_range_summary(store, start, end)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn event(store: &SqliteStore, args: EventArgs) -> anyhow::Result<()> {
    let event_id: EventId = args
        .id
        .parse()
        .with_context(|| format!("invalid event id: {}", args.id))?;
    match factline_pipeline::event_detail(store, event_id) {
        Ok(detail) => {
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(())
        }
        Err(PipelineError::NotFound { entity, id }) => bail!("{entity} not found: {id}"),
        Err(e) => Err(e.into()),
    }
}
