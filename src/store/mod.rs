//! Moodtrack Entry Store
//!
//! Authoritative, per-user collection of mood entries:
//!
//! - **entry_store**: SQLite-backed CRUD with change notifications
//! - **snapshot**: immutable full-collection snapshots pushed after writes
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   create/update/delete → SQLite (mood_entries) → list(user) → broadcast EntrySnapshot
//!
//! Read Path:
//!   list(user) → Vec<MoodEntry> (newest first) → engine::*
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use moodtrack::model::{NewEntry, Tag};
//! use moodtrack::store::{EntryStore, StoreConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = EntryStore::open(&StoreConfig::new("./data"))?;
//! store.create("alice", NewEntry::new(4).tag(Tag::Exercise))?;
//!
//! let entries = store.list("alice")?;
//! let stats = moodtrack::engine::overall_stats(&entries);
//! # Ok(())
//! # }
//! ```

pub mod entry_store;
pub mod error;
pub mod snapshot;

pub use entry_store::{EntryStore, StoreConfig, StoreStats};
pub use error::{StoreError, StoreResult};
pub use snapshot::EntrySnapshot;
