//! Mood Aggregation Engine
//!
//! Pure functions that project a user's entry list into the views the UI
//! renders:
//!
//! - **lookup**: date-indexed lookup (first match wins)
//! - **calendar**: Monday-start weekly snapshot and Sunday-start month grid
//! - **series**: rolling N-day series for trend charts
//! - **stats**: overall statistics, tag correlation, recent entries
//! - **dashboard**: the combined payload pushed to live clients
//!
//! # Contract
//!
//! ```text
//! Entry Store snapshot ──► engine::* (no I/O, no clock) ──► API / WebSocket
//! ```
//!
//! Every function takes the entry slice and any reference date explicitly.
//! Nothing here reads the wall clock or mutates its input, so the same input
//! always yields the same output. Entries whose mood is outside 1..=5 are
//! skipped by every statistic; missing data is `None` or an empty result.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use moodtrack::engine;
//!
//! let entries = Vec::new();
//! let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//!
//! let week = engine::weekly_snapshot(&entries, today);
//! assert_eq!(week.len(), 7);
//! assert!(engine::overall_stats(&entries).is_none());
//! ```

pub mod calendar;
pub mod dashboard;
pub mod lookup;
pub mod series;
pub mod stats;

pub use calendar::{
    month_grid, week_start, weekly_snapshot, CalendarCell, DaySlot, MonthGrid, MonthSummary,
};
pub use dashboard::{dashboard, Dashboard, DEFAULT_RECENT_LIMIT};
pub use lookup::{date_key, find_by_date, find_by_date_str, parse_date, DateIndex};
pub use series::{rolling_series, SeriesPoint, DEFAULT_SERIES_DAYS};
pub use stats::{overall_stats, recent_entries, tag_stats, MoodStats, TagStat, TOP_TAGS};

#[cfg(test)]
pub(crate) mod testutil {
    use crate::model::{MoodEntry, Tag};
    use chrono::NaiveDate;

    pub fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Build an entry for a date with a mood and tags
    pub fn entry(date: &str, mood: u8, tags: &[Tag]) -> MoodEntry {
        let d = day(date);
        MoodEntry {
            id: format!("{}-{}", date, mood),
            user_id: "user-1".to_string(),
            mood,
            date: d,
            timestamp: d.and_hms_opt(12, 0, 0).unwrap().and_utc(),
            updated_at: None,
            note: None,
            tags: tags.to_vec(),
        }
    }
}
