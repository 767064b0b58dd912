//! Immutable entry snapshots for live consumers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::model::MoodEntry;

/// A user's full entry collection at one point in time
///
/// Cloning is cheap; the entry list is shared.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub user_id: String,
    /// Newest first, the same order as `EntryStore::list`
    pub entries: Arc<Vec<MoodEntry>>,
    pub taken_at: DateTime<Utc>,
}

impl EntrySnapshot {
    pub fn new(user_id: impl Into<String>, entries: Vec<MoodEntry>) -> Self {
        Self {
            user_id: user_id.into(),
            entries: Arc::new(entries),
            taken_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
