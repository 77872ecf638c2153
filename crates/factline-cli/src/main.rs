//! Factline CLI - operational entry points for the archive pipeline.

mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Command};
use config::FactlineConfig;
use factline_store::SqliteStore;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = FactlineConfig::load(cli.config.as_deref())?;
    let mut store = SqliteStore::new(&cli.db)?;

    match cli.command {
        Command::Normalize => commands::normalize(&mut store),
        Command::Cluster => commands::cluster(&mut store, &config),
        Command::Claims(args) => commands::claims(&mut store, args),
        Command::Filter(args) => commands::filter(&mut store, &config, args),
        Command::Log(args) => commands::log(&mut store, args),
        Command::Verify => commands::verify(&store),
        Command::Days(args) => commands::days(&store, args),
        Command::Event(args) => commands::event(&store, args),
    }
}
