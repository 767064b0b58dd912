//! SQLite-backed entry store
//!
//! One table, `mood_entries`, scoped by `user_id` on every statement.
//! Instants are stored as fixed-width RFC 3339 text (UTC, microseconds) so
//! lexical order equals chronological order; tags are a JSON array of labels.
//!
//! Every successful mutation publishes the user's full collection as an
//! `EntrySnapshot` on a broadcast channel.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

use super::error::{StoreError, StoreResult};
use super::snapshot::EntrySnapshot;
use crate::model::{dedup_tags, is_valid_mood, EntryPatch, MoodEntry, NewEntry, Tag};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS mood_entries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        mood INTEGER NOT NULL,
        date TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        updated_at TEXT,
        note TEXT,
        tags TEXT NOT NULL DEFAULT '[]'
    );
    CREATE INDEX IF NOT EXISTS idx_entries_user_ts ON mood_entries(user_id, timestamp);
    CREATE INDEX IF NOT EXISTS idx_entries_user_date ON mood_entries(user_id, date);
";

const SELECT_COLUMNS: &str = "id, user_id, mood, date, timestamp, updated_at, note, tags";

/// Entry store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the database file
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir`
    pub db_file: String,
    /// Capacity of the snapshot broadcast channel
    pub snapshot_capacity: usize,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Full path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("moodtrack_data"),
            db_file: "moodtrack.db".to_string(),
            snapshot_capacity: 64,
        }
    }
}

/// Store-wide counters
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct StoreStats {
    pub total_entries: usize,
    pub users: usize,
}

/// Per-user mood entry collection
pub struct EntryStore {
    /// std Mutex because rusqlite connections are not Sync
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    snapshots: broadcast::Sender<EntrySnapshot>,
}

impl EntryStore {
    /// Open (or create) the store described by `config`
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let path = config.db_path();

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        tracing::info!(path = ?path, "Opened entry store");
        Self::init(conn, Some(path), config.snapshot_capacity)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None, StoreConfig::default().snapshot_capacity)
    }

    fn init(conn: Connection, path: Option<PathBuf>, capacity: usize) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        let (snapshots, _) = broadcast::channel(capacity.max(1));

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            snapshots,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    // ==================== Reads ====================

    /// All entries of a user, newest first
    pub fn list(&self, user_id: &str) -> StoreResult<Vec<MoodEntry>> {
        let conn = self.conn()?;
        list_entries(&conn, user_id)
    }

    /// One entry of a user
    pub fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<MoodEntry>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM mood_entries WHERE user_id = ?1 AND id = ?2"
                ),
                params![user_id, id],
                RawEntry::from_row,
            )
            .optional()?;

        raw.map(RawEntry::into_entry).transpose()
    }

    /// Number of entries a user has
    pub fn count(&self, user_id: &str) -> StoreResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM mood_entries WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Counters across all users
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.conn()?;
        let (total, users): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT user_id) FROM mood_entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(StoreStats {
            total_entries: total as usize,
            users: users as usize,
        })
    }

    /// Current snapshot of a user's entries
    pub fn snapshot(&self, user_id: &str) -> StoreResult<EntrySnapshot> {
        Ok(EntrySnapshot::new(user_id, self.list(user_id)?))
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> broadcast::Receiver<EntrySnapshot> {
        self.snapshots.subscribe()
    }

    // ==================== Writes ====================

    /// Submit a mood entry dated today
    pub fn create(&self, user_id: &str, new: NewEntry) -> StoreResult<MoodEntry> {
        self.create_at(user_id, new, Utc::now())
    }

    /// Submit a mood entry created at `timestamp`
    ///
    /// The entry's date is the local calendar day of `timestamp`.
    pub fn create_at(
        &self,
        user_id: &str,
        new: NewEntry,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<MoodEntry> {
        validate_user(user_id)?;
        if !is_valid_mood(new.mood) {
            return Err(StoreError::InvalidMood(new.mood));
        }

        let entry = MoodEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            mood: new.mood,
            date: timestamp.with_timezone(&Local).date_naive(),
            timestamp,
            updated_at: None,
            note: normalize_note(new.note),
            tags: dedup_tags(&new.tags),
        };

        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO mood_entries (id, user_id, mood, date, timestamp, updated_at, note, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)",
                params![
                    entry.id,
                    entry.user_id,
                    entry.mood,
                    entry.date.format("%Y-%m-%d").to_string(),
                    format_instant(&entry.timestamp),
                    entry.note,
                    encode_tags(&entry.tags)?,
                ],
            )?;
            tracing::info!(user_id = %user_id, entry_id = %entry.id, mood = entry.mood, "Created mood entry");
            self.publish(&conn, user_id);
        }

        Ok(entry)
    }

    /// Apply a partial update; the entry's date never changes
    pub fn update(&self, user_id: &str, id: &str, patch: EntryPatch) -> StoreResult<MoodEntry> {
        if let Some(mood) = patch.mood {
            if !is_valid_mood(mood) {
                return Err(StoreError::InvalidMood(mood));
            }
        }

        let mut entry = self
            .get(user_id, id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(mood) = patch.mood {
            entry.mood = mood;
        }
        if let Some(note) = patch.note {
            entry.note = normalize_note(note);
        }
        if let Some(tags) = patch.tags {
            entry.tags = dedup_tags(&tags);
        }
        entry.updated_at = Some(Utc::now());

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE mood_entries SET mood = ?1, note = ?2, tags = ?3, updated_at = ?4
             WHERE user_id = ?5 AND id = ?6",
            params![
                entry.mood,
                entry.note,
                encode_tags(&entry.tags)?,
                entry.updated_at.as_ref().map(format_instant),
                user_id,
                id,
            ],
        )?;

        // Deleted between the read and the write
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %user_id, entry_id = %id, "Updated mood entry");
        self.publish(&conn, user_id);
        Ok(entry)
    }

    /// Delete one entry
    pub fn delete(&self, user_id: &str, id: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM mood_entries WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %user_id, entry_id = %id, "Deleted mood entry");
        self.publish(&conn, user_id);
        Ok(())
    }

    /// Delete all of a user's entries, returning how many were removed
    pub fn clear(&self, user_id: &str) -> StoreResult<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM mood_entries WHERE user_id = ?1",
            params![user_id],
        )?;

        tracing::warn!(user_id = %user_id, removed, "Cleared all mood entries");
        self.publish(&conn, user_id);
        Ok(removed)
    }

    /// Push the user's current collection to subscribers
    ///
    /// Called with the writer's lock held so snapshots go out in commit order.
    /// A failed snapshot read is logged; the write itself already succeeded.
    fn publish(&self, conn: &Connection, user_id: &str) {
        if self.snapshots.receiver_count() == 0 {
            return;
        }

        match list_entries(conn, user_id) {
            Ok(entries) => {
                let snapshot = EntrySnapshot::new(user_id, entries);
                tracing::debug!(user_id = %user_id, entries = snapshot.len(), "Publishing snapshot");
                let _ = self.snapshots.send(snapshot);
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to build entry snapshot");
            }
        }
    }
}

/// Entries of a user, newest first, on an already locked connection
fn list_entries(conn: &Connection, user_id: &str) -> StoreResult<Vec<MoodEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {SELECT_COLUMNS} FROM mood_entries
         WHERE user_id = ?1
         ORDER BY timestamp DESC, id DESC"
    ))?;

    let rows = stmt
        .query_map(params![user_id], RawEntry::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(RawEntry::into_entry).collect()
}

fn validate_user(user_id: &str) -> StoreResult<()> {
    if user_id.trim().is_empty() {
        return Err(StoreError::InvalidInput("user id cannot be empty".to_string()));
    }
    Ok(())
}

/// Trim notes; blank notes are stored as absent
fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_tags(tags: &[Tag]) -> StoreResult<String> {
    Ok(serde_json::to_string(tags)?)
}

/// Columns as stored, before decoding
struct RawEntry {
    id: String,
    user_id: String,
    mood: i64,
    date: String,
    timestamp: String,
    updated_at: Option<String>,
    note: Option<String>,
    tags: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            mood: row.get(2)?,
            date: row.get(3)?,
            timestamp: row.get(4)?,
            updated_at: row.get(5)?,
            note: row.get(6)?,
            tags: row.get(7)?,
        })
    }

    /// Decode a row
    ///
    /// Out-of-range moods are kept as-is (a value that does not fit `u8`
    /// becomes 0) so the engine can skip them; unknown tags are dropped.
    fn into_entry(self) -> StoreResult<MoodEntry> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            StoreError::Corruption(format!("entry {}: bad date '{}': {}", self.id, self.date, e))
        })?;
        let timestamp = parse_instant(&self.id, &self.timestamp)?;
        let updated_at = self
            .updated_at
            .as_deref()
            .map(|s| parse_instant(&self.id, s))
            .transpose()?;

        let labels: Vec<String> = serde_json::from_str(&self.tags).map_err(|e| {
            StoreError::Corruption(format!("entry {}: bad tags: {}", self.id, e))
        })?;
        let mut tags = Vec::with_capacity(labels.len());
        for label in labels {
            match label.parse::<Tag>() {
                Ok(tag) => tags.push(tag),
                Err(e) => tracing::warn!(entry_id = %self.id, error = %e, "Dropping unknown tag"),
            }
        }

        let mood = u8::try_from(self.mood).unwrap_or(0);
        if !is_valid_mood(mood) {
            tracing::warn!(entry_id = %self.id, mood = self.mood, "Stored entry has malformed mood");
        }

        Ok(MoodEntry {
            id: self.id,
            user_id: self.user_id,
            mood,
            date,
            timestamp,
            updated_at,
            note: self.note,
            tags: dedup_tags(&tags),
        })
    }
}

fn parse_instant(id: &str, s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corruption(format!("entry {}: bad instant '{}': {}", id, s, e)))
}
