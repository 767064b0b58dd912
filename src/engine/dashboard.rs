//! Dashboard payload
//!
//! Combines the weekly snapshot, overall statistics and the latest entries.
//! This is what live clients receive after every change to their entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::{weekly_snapshot, DaySlot};
use super::stats::{overall_stats, recent_entries, MoodStats};
use crate::model::MoodEntry;

/// Number of recent entries shown on the dashboard
pub const DEFAULT_RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    pub week: [DaySlot; 7],
    pub stats: Option<MoodStats>,
    pub recent: Vec<MoodEntry>,
    /// Share of good days, `None` without statistics
    pub good_day_ratio: Option<f64>,
}

/// Build the dashboard for `today` from a snapshot (newest entries first)
pub fn dashboard(entries: &[MoodEntry], today: NaiveDate, recent_limit: usize) -> Dashboard {
    let stats = overall_stats(entries);
    let good_day_ratio = stats.as_ref().map(MoodStats::good_day_ratio);

    Dashboard {
        today,
        week: weekly_snapshot(entries, today),
        stats,
        recent: recent_entries(entries, recent_limit).to_vec(),
        good_day_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{day, entry};

    #[test]
    fn test_dashboard_combines_views() {
        let entries = vec![
            entry("2024-01-10", 5, &[]),
            entry("2024-01-09", 4, &[]),
            entry("2024-01-08", 1, &[]),
            entry("2024-01-01", 2, &[]),
        ];
        let board = dashboard(&entries, day("2024-01-10"), DEFAULT_RECENT_LIMIT);

        assert_eq!(board.recent.len(), 3);
        assert_eq!(board.recent[0].date, day("2024-01-10"));
        assert_eq!(board.week[0].mood, Some(1));
        assert_eq!(board.week[2].mood, Some(5));
        assert_eq!(board.stats.as_ref().unwrap().total_entries, 4);
        assert_eq!(board.good_day_ratio, Some(0.5));
    }

    #[test]
    fn test_dashboard_empty() {
        let board = dashboard(&[], day("2024-01-10"), DEFAULT_RECENT_LIMIT);
        assert!(board.stats.is_none());
        assert!(board.good_day_ratio.is_none());
        assert!(board.recent.is_empty());
        assert!(board.week.iter().all(|s| !s.has_entry));
    }
}
