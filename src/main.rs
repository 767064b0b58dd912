//! Moodtrack API Server
//!
//! Run with: cargo run --bin moodtrack [-- --config path/to/config.toml]
//!
//! # Configuration
//!
//! Loaded from the first config file found (`--config`, then
//! `~/.config/moodtrack/config.toml`, `/etc/moodtrack/config.toml`,
//! `./config.toml`), overridden by environment variables:
//! - `MOODTRACK_DATA_DIR`: Data directory
//! - `MOODTRACK_API_HOST` / `MOODTRACK_API_PORT`: Bind address (default 0.0.0.0:8090)
//! - `MOODTRACK_SUGGEST_ENABLED`: Enable `/api/v1/suggest` (default: true)
//! - `MOODTRACK_LOG_LEVEL` / `MOODTRACK_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Full filter directive, replaces the level

use anyhow::Context;
use clap::Parser;
use moodtrack::api::{serve, AppState};
use moodtrack::config::{generate_default_config, Config};
use moodtrack::store::EntryStore;
use moodtrack::suggest::SimulatedSuggester;
use moodtrack::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

/// Moodtrack API server
#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(version, about = "Moodtrack API server")]
struct Args {
    /// Config file (default: first of the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    telemetry::init(&config.logging).context("failed to initialise logging")?;

    tracing::info!("Starting Moodtrack server v{}", env!("CARGO_PKG_VERSION"));

    let store_config = config.storage.store_config();
    tracing::info!("Data directory: {:?}", store_config.data_dir);

    let store = Arc::new(EntryStore::open(&store_config).context("failed to open entry store")?);
    let stats = store.stats()?;
    tracing::info!(
        entries = stats.total_entries,
        users = stats.users,
        "Entry store ready"
    );

    let mut state = AppState::new(Arc::clone(&store), config.api.clone());
    if config.suggest.enabled {
        tracing::info!(delay_ms = config.suggest.delay_ms, "Mood suggestions enabled (simulated)");
        state = state.with_suggester(Arc::new(SimulatedSuggester::new(config.suggest.delay())));
    } else {
        tracing::info!("Mood suggestions disabled");
    }

    serve(state, &config.api).await?;

    tracing::info!("Moodtrack server stopped");
    Ok(())
}
