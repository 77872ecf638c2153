//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Factline CLI - archive news sources and verify their claim record.
#[derive(Debug, Parser)]
#[command(name = "factline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database path
    #[arg(long, global = true, env = "FACTLINE_DB", default_value = "factline.db")]
    pub db: String,

    /// Configuration file path (toml)
    #[arg(short, long, global = true, env = "FACTLINE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize captured text artifacts and record content hashes
    Normalize,

    /// Cluster unclustered items into same-day events
    Cluster,

    /// Extract claims from clustered items and score them
    Claims(ClaimsArgs),

    /// Mark recent non-significant items as filtered
    Filter(FilterArgs),

    /// Append a daily transparency log entry
    Log(LogArgs),

    /// Verify the transparency log chain
    Verify,

    /// Show event counts for a day range
    Days(DaysArgs),

    /// Show one event with its sources and claims
    Event(EventArgs),
}

/// Arguments for the claims command.
#[derive(Debug, Parser)]
pub struct ClaimsArgs {
    /// Process at most this many normalized texts
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the filter command.
#[derive(Debug, Parser)]
pub struct FilterArgs {
    /// Look back this many hours for candidates
    #[arg(long, default_value_t = 24)]
    pub hours: i64,

    /// Count without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the log command.
#[derive(Debug, Parser)]
pub struct LogArgs {
    /// Day to snapshot, YYYY-MM-DD (defaults to today UTC)
    #[arg(long)]
    pub date: Option<String>,
}

/// Arguments for the days command.
#[derive(Debug, Parser)]
pub struct DaysArgs {
    /// Range start, YYYY-MM-DD
    #[arg(long)]
    pub start: String,

    /// Range end, YYYY-MM-DD (inclusive)
    #[arg(long)]
    pub end: String,
}

/// Arguments for the event command.
#[derive(Debug, Parser)]
pub struct EventArgs {
    /// Event id
    pub id: String,
}
