//! Weekly snapshot and monthly calendar grid
//!
//! The week view is Monday-start (ISO week), the month view is a grid of
//! whole Sunday-start weeks covering the target month.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lookup::DateIndex;
use super::stats::mean_one_decimal;
use crate::model::{MoodEntry, YearMonth};

/// One day of the weekly snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySlot {
    pub date: NaiveDate,
    /// Short weekday name, "Mon".."Sun"
    pub weekday_label: String,
    /// Mood of the day's entry; `None` if there is no entry or it is malformed
    pub mood: Option<u8>,
    pub has_entry: bool,
}

/// One cell of the month grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_target_month: bool,
    pub is_today: bool,
    pub entry: Option<MoodEntry>,
}

/// Aggregates over the days of the target month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Days with a well-formed entry
    pub days_logged: usize,
    /// Mean mood over logged days, one decimal; 0.0 when none
    pub average_mood: f64,
    /// Logged days with mood >= 4
    pub good_days: usize,
}

/// Calendar grid for a month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year_month: YearMonth,
    pub cells: Vec<CalendarCell>,
    pub summary: MonthSummary,
}

impl MonthGrid {
    /// Number of grid rows
    pub fn weeks(&self) -> usize {
        self.cells.len() / 7
    }
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Sunday on or before `date`
fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Saturday on or after `date`
fn saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    let ahead = 6 - date.weekday().num_days_from_sunday() as u64;
    date.checked_add_days(Days::new(ahead)).unwrap_or(date)
}

/// Seven slots, Monday through Sunday, for the week containing `reference_date`
pub fn weekly_snapshot(entries: &[MoodEntry], reference_date: NaiveDate) -> [DaySlot; 7] {
    let index = DateIndex::new(entries);
    let monday = week_start(reference_date);

    std::array::from_fn(|offset| {
        let date = monday
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(monday);
        let entry = index.get(date);
        DaySlot {
            date,
            weekday_label: date.format("%a").to_string(),
            mood: entry.and_then(MoodEntry::valid_mood),
            has_entry: entry.is_some(),
        }
    })
}

/// Sunday-start grid of whole weeks covering `year_month`
///
/// `today` marks the `is_today` cell; it is a parameter so the grid does not
/// depend on the wall clock.
pub fn month_grid(entries: &[MoodEntry], year_month: YearMonth, today: NaiveDate) -> MonthGrid {
    let index = DateIndex::new(entries);
    let start = sunday_on_or_before(year_month.first_day());
    let end = saturday_on_or_after(year_month.last_day());

    let cells: Vec<CalendarCell> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| CalendarCell {
            date,
            in_target_month: year_month.contains(date),
            is_today: date == today,
            entry: index.get(date).cloned(),
        })
        .collect();

    let mut days_logged = 0usize;
    let mut mood_sum = 0u64;
    let mut good_days = 0usize;

    for mood in cells
        .iter()
        .filter(|c| c.in_target_month)
        .filter_map(|c| c.entry.as_ref().and_then(MoodEntry::valid_mood))
    {
        days_logged += 1;
        mood_sum += u64::from(mood);
        if mood >= 4 {
            good_days += 1;
        }
    }

    let summary = MonthSummary {
        days_logged,
        average_mood: mean_one_decimal(mood_sum, days_logged as u64).unwrap_or(0.0),
        good_days,
    };

    tracing::trace!(
        month = %year_month,
        cells = cells.len(),
        days_logged,
        "Built month grid"
    );

    MonthGrid {
        year_month,
        cells,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{day, entry};
    use chrono::Weekday;

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-10 is a Wednesday
        assert_eq!(week_start(day("2024-01-10")), day("2024-01-08"));
        assert_eq!(week_start(day("2024-01-08")), day("2024-01-08"));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(day("2024-01-14")), day("2024-01-08"));
    }

    #[test]
    fn test_weekly_snapshot_fixed_order() {
        let entries = vec![entry("2024-01-09", 4, &[]), entry("2024-01-14", 2, &[])];

        for reference in ["2024-01-08", "2024-01-11", "2024-01-14"] {
            let week = weekly_snapshot(&entries, day(reference));
            assert_eq!(week.len(), 7);
            assert_eq!(week[0].date, day("2024-01-08"));
            assert_eq!(week[0].weekday_label, "Mon");
            assert_eq!(week[6].date, day("2024-01-14"));
            assert_eq!(week[6].weekday_label, "Sun");
            assert_eq!(week[0].date.weekday(), Weekday::Mon);
        }

        let week = weekly_snapshot(&entries, day("2024-01-10"));
        assert_eq!(week[1].mood, Some(4));
        assert!(week[1].has_entry);
        assert_eq!(week[6].mood, Some(2));
        assert_eq!(week[2].mood, None);
        assert!(!week[2].has_entry);
    }

    #[test]
    fn test_weekly_snapshot_malformed_entry() {
        let entries = vec![entry("2024-01-09", 9, &[])];
        let week = weekly_snapshot(&entries, day("2024-01-09"));
        assert!(week[1].has_entry);
        assert_eq!(week[1].mood, None);
    }

    #[test]
    fn test_month_grid_shape() {
        // January 2024 starts on Monday and ends on Wednesday
        let grid = month_grid(&[], YearMonth::new(2024, 1).unwrap(), day("2024-01-15"));
        assert_eq!(grid.cells.len(), 35);
        assert_eq!(grid.weeks(), 5);
        assert_eq!(grid.cells[0].date, day("2023-12-31"));
        assert_eq!(grid.cells[34].date, day("2024-02-03"));
        assert_eq!(grid.cells[0].date.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_month_grid_contains_each_day_once() {
        for (year, month) in [(2024, 2), (2023, 9), (2026, 2), (2021, 5)] {
            let ym = YearMonth::new(year, month).unwrap();
            let grid = month_grid(&[], ym, day("2000-01-01"));
            assert_eq!(grid.cells.len() % 7, 0);

            let in_month: Vec<_> = grid.cells.iter().filter(|c| c.in_target_month).collect();
            assert_eq!(in_month.len() as u32, ym.last_day().day());
            for (i, cell) in in_month.iter().enumerate() {
                assert_eq!(cell.date.day(), i as u32 + 1);
            }
        }
    }

    #[test]
    fn test_month_grid_exact_four_weeks() {
        // February 2026 starts on Sunday and ends on Saturday
        let grid = month_grid(&[], YearMonth::new(2026, 2).unwrap(), day("2026-02-01"));
        assert_eq!(grid.cells.len(), 28);
        assert!(grid.cells.iter().all(|c| c.in_target_month));
        assert!(grid.cells[0].is_today);
    }

    #[test]
    fn test_month_grid_today_and_entries() {
        let entries = vec![
            entry("2024-01-03", 5, &[]),
            entry("2024-01-04", 4, &[]),
            entry("2024-01-05", 2, &[]),
            // Outside the month but inside the grid
            entry("2023-12-31", 1, &[]),
        ];
        let grid = month_grid(&entries, YearMonth::new(2024, 1).unwrap(), day("2024-01-04"));

        let today: Vec<_> = grid.cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, day("2024-01-04"));

        assert!(grid.cells[0].entry.is_some());
        assert!(!grid.cells[0].in_target_month);

        assert_eq!(grid.summary.days_logged, 3);
        assert_eq!(grid.summary.good_days, 2);
        assert_eq!(grid.summary.average_mood, 3.7);
    }

    #[test]
    fn test_month_summary_empty_and_malformed() {
        let entries = vec![entry("2024-01-10", 0, &[])];
        let grid = month_grid(&entries, YearMonth::new(2024, 1).unwrap(), day("2024-01-10"));
        assert_eq!(grid.summary.days_logged, 0);
        assert_eq!(grid.summary.average_mood, 0.0);
        assert_eq!(grid.summary.good_days, 0);
    }
}
