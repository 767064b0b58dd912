//! Rolling N-day series for trend charts

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lookup::DateIndex;
use crate::model::MoodEntry;

/// Window used by the analytics trend chart
pub const DEFAULT_SERIES_DAYS: usize = 30;

/// One day on a trend chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// Axis label, e.g. "Jan 5"
    pub label: String,
    /// `None` when the day has no well-formed entry
    pub mood: Option<u8>,
}

/// `n` points, oldest first, ending on `end_date` inclusive
pub fn rolling_series(entries: &[MoodEntry], end_date: NaiveDate, n: usize) -> Vec<SeriesPoint> {
    if n == 0 {
        return Vec::new();
    }

    let index = DateIndex::new(entries);
    let start = end_date
        .checked_sub_days(Days::new((n - 1) as u64))
        .unwrap_or(NaiveDate::MIN);

    start
        .iter_days()
        .take_while(|d| *d <= end_date)
        .take(n)
        .map(|date| SeriesPoint {
            date,
            label: date.format("%b %-d").to_string(),
            mood: index.get(date).and_then(MoodEntry::valid_mood),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{day, entry};

    #[test]
    fn test_thirty_day_window() {
        let end = day("2024-03-01");
        let series = rolling_series(&[], end, DEFAULT_SERIES_DAYS);

        assert_eq!(series.len(), 30);
        assert_eq!(series.last().unwrap().date, end);
        // 2024 is a leap year: 29 days before March 1st is January 31st
        assert_eq!(series[0].date, day("2024-01-31"));
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_absent_days_are_none() {
        let entries = vec![entry("2024-01-05", 3, &[]), entry("2024-01-07", 0, &[])];
        let series = rolling_series(&entries, day("2024-01-07"), 3);

        assert_eq!(series[0].mood, Some(3));
        assert_eq!(series[1].mood, None);
        // Malformed entries never leak into the series
        assert_eq!(series[2].mood, None);
        assert!(series.iter().all(|p| p.mood != Some(0)));
    }

    #[test]
    fn test_labels() {
        let series = rolling_series(&[], day("2024-01-05"), 1);
        assert_eq!(series[0].label, "Jan 5");
    }

    #[test]
    fn test_zero_length() {
        assert!(rolling_series(&[], day("2024-01-05"), 0).is_empty());
    }
}
