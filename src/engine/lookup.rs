//! Date-indexed lookup
//!
//! Maps a calendar day to the entry recorded for it. The store does not
//! enforce one entry per day, so when several share a date the FIRST in the
//! given ordering wins, both for the linear `find_by_date` and for the
//! prebuilt `DateIndex`.

use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;

use crate::model::MoodEntry;

/// Canonical `yyyy-MM-dd` key for a date
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Normalize date text to a day
///
/// Accepts `yyyy-MM-dd` or a full RFC 3339 instant (its calendar date is used).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// First entry in `entries` recorded for `date`
pub fn find_by_date(entries: &[MoodEntry], date: NaiveDate) -> Option<&MoodEntry> {
    entries.iter().find(|e| e.date == date)
}

/// Like `find_by_date`, taking date text; unparsable text finds nothing
pub fn find_by_date_str<'a>(entries: &'a [MoodEntry], date: &str) -> Option<&'a MoodEntry> {
    parse_date(date).and_then(|d| find_by_date(entries, d))
}

/// Prebuilt day → entry map for repeated lookups
///
/// Agrees with `find_by_date` for every date.
#[derive(Debug)]
pub struct DateIndex<'a> {
    by_date: HashMap<NaiveDate, &'a MoodEntry>,
}

impl<'a> DateIndex<'a> {
    /// Index a snapshot, keeping the first entry per day
    pub fn new(entries: &'a [MoodEntry]) -> Self {
        let mut by_date = HashMap::with_capacity(entries.len());
        for entry in entries {
            by_date.entry(entry.date).or_insert(entry);
        }
        Self { by_date }
    }

    /// Entry for a day
    pub fn get(&self, date: NaiveDate) -> Option<&'a MoodEntry> {
        self.by_date.get(&date).copied()
    }

    /// Number of distinct days with an entry
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{day, entry};

    #[test]
    fn test_find_by_date_first_match_wins() {
        let mut second = entry("2024-01-02", 2, &[]);
        second.id = "second".to_string();
        let mut first = entry("2024-01-02", 5, &[]);
        first.id = "first".to_string();
        let entries = vec![entry("2024-01-01", 3, &[]), first, second];

        let found = find_by_date(&entries, day("2024-01-02")).unwrap();
        assert_eq!(found.id, "first");
        assert_eq!(found.mood, 5);
    }

    #[test]
    fn test_find_by_date_absent() {
        let entries = vec![entry("2024-01-01", 3, &[])];
        assert!(find_by_date(&entries, day("2024-01-05")).is_none());
        assert!(find_by_date(&[], day("2024-01-01")).is_none());
    }

    #[test]
    fn test_find_by_date_str_normalizes() {
        let entries = vec![entry("2024-03-09", 4, &[])];
        assert!(find_by_date_str(&entries, "2024-03-09").is_some());
        assert!(find_by_date_str(&entries, "2024-03-09T18:30:00+00:00").is_some());
        assert!(find_by_date_str(&entries, "not a date").is_none());
    }

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(day("2024-01-05")), "2024-01-05");
    }

    #[test]
    fn test_index_agrees_with_linear_lookup() {
        let entries = vec![
            entry("2024-01-01", 3, &[]),
            entry("2024-01-03", 1, &[]),
            entry("2024-01-01", 5, &[]),
        ];
        let index = DateIndex::new(&entries);
        assert_eq!(index.len(), 2);

        for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            let date = day(d);
            assert_eq!(
                index.get(date).map(|e| e.id.clone()),
                find_by_date(&entries, date).map(|e| e.id.clone())
            );
        }
    }
}
