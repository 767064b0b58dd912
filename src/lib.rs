//! # Moodtrack
//!
//! Personal mood tracking: a daily mood journal with weekly, calendar,
//! trend and tag analytics.
//!
//! ## Features
//!
//! - **Aggregation engine**: pure functions from a list of entries to weekly
//!   snapshots, month grids, rolling series and statistics
//! - **Entry store**: SQLite-backed, per-user, with change snapshots
//! - **REST API**: entry CRUD plus every aggregation
//! - **Real-time**: WebSocket pushes of snapshots and dashboards
//! - **Export**: JSON, CSV and NDJSON downloads
//!
//! ## Modules
//!
//! - [`model`]: Entries, mood levels, tags, year-months
//! - [`engine`]: Aggregation and calendar projection
//! - [`store`]: Entry store
//! - [`suggest`]: Mood suggestions
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Live updates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Local;
//! use moodtrack::engine::{overall_stats, weekly_snapshot};
//! use moodtrack::model::{NewEntry, Tag};
//! use moodtrack::store::EntryStore;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EntryStore::open_in_memory()?;
//!
//!     store.create("alice", NewEntry::new(4).note("long walk").tag(Tag::Exercise))?;
//!     store.create("alice", NewEntry::new(2).tag(Tag::Work))?;
//!
//!     let entries = store.list("alice")?;
//!     let week = weekly_snapshot(&entries, Local::now().date_naive());
//!
//!     if let Some(stats) = overall_stats(&entries) {
//!         println!("{} entries, average {}", stats.total_entries, stats.average_mood);
//!     }
//!     println!("{} days logged this week", week.iter().filter(|d| d.has_entry).count());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod model;
pub mod store;
pub mod suggest;
pub mod telemetry;
pub mod websocket;

// Re-export top-level types for convenience
pub use model::{EntryPatch, MoodEntry, MoodLevel, NewEntry, Tag, YearMonth, MOOD_LEVELS};

pub use engine::{
    dashboard, month_grid, overall_stats, rolling_series, tag_stats, weekly_snapshot, Dashboard,
    DaySlot, MonthGrid, MoodStats, SeriesPoint, TagStat,
};

pub use store::{EntrySnapshot, EntryStore, StoreConfig, StoreError, StoreResult};

pub use suggest::{MoodSuggester, MoodSuggestion, SimulatedSuggester, SuggestError};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage, WsEvent,
};

pub use config::{Config, ConfigError, LoggingConfig};
