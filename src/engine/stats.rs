//! Overall statistics and tag correlation
//!
//! Both computations skip malformed entries (mood outside 1..=5) instead of
//! failing, so one corrupt record cannot break the analytics page.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{MoodEntry, Tag};

/// Maximum number of tags reported by `tag_stats`
pub const TOP_TAGS: usize = 8;

/// Statistics over a user's whole history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodStats {
    /// Number of well-formed entries
    pub total_entries: usize,
    /// Mean mood, rounded half-up to one decimal
    pub average_mood: f64,
    /// Observed mood → occurrences
    pub mood_counts: BTreeMap<u8, usize>,
    /// Most frequent mood; ties go to the higher mood
    pub most_common_mood: u8,
}

impl MoodStats {
    /// Entries with mood 4 or 5
    pub fn good_days(&self) -> usize {
        self.mood_counts
            .iter()
            .filter(|(mood, _)| **mood >= 4)
            .map(|(_, count)| count)
            .sum()
    }

    /// Share of good days, 0.0..=1.0
    pub fn good_day_ratio(&self) -> f64 {
        if self.total_entries == 0 {
            return 0.0;
        }
        self.good_days() as f64 / self.total_entries as f64
    }

    /// Occurrences of one mood level (0 when never observed)
    pub fn count_of(&self, mood: u8) -> usize {
        self.mood_counts.get(&mood).copied().unwrap_or(0)
    }
}

/// Mood aggregate for one tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagStat {
    pub tag: Tag,
    /// Entries carrying the tag
    pub count: usize,
    /// Mean mood of those entries (unrounded)
    pub average_mood: f64,
}

/// Mean of `count` integer moods summing to `sum`, rounded half-up to one decimal
///
/// Done in integer arithmetic so halves like 3.65 are not lost to binary
/// floating point. `None` when `count` is 0.
pub(crate) fn mean_one_decimal(sum: u64, count: u64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    let tenths = (20 * sum + count) / (2 * count);
    Some(tenths as f64 / 10.0)
}

/// Overall statistics, `None` when there is no well-formed entry
pub fn overall_stats(entries: &[MoodEntry]) -> Option<MoodStats> {
    let mut mood_counts: BTreeMap<u8, usize> = BTreeMap::new();
    let mut sum = 0u64;
    let mut total = 0usize;

    for mood in entries.iter().filter_map(MoodEntry::valid_mood) {
        *mood_counts.entry(mood).or_insert(0) += 1;
        sum += u64::from(mood);
        total += 1;
    }

    let skipped = entries.len() - total;
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped malformed entries in statistics");
    }

    // Ascending scan; a later key replaces the best on a tie
    let mut most_common: Option<(u8, usize)> = None;
    for (&mood, &count) in &mood_counts {
        match most_common {
            Some((_, best)) if best > count => {}
            _ => most_common = Some((mood, count)),
        }
    }
    let (most_common_mood, _) = most_common?;

    Some(MoodStats {
        total_entries: total,
        average_mood: mean_one_decimal(sum, total as u64)?,
        mood_counts,
        most_common_mood,
    })
}

/// Per-tag counts and mean moods, most used first, at most `TOP_TAGS`
///
/// Equal counts keep the order in which tags were first seen. Each entry
/// counts once per distinct tag it carries.
pub fn tag_stats(entries: &[MoodEntry]) -> Vec<TagStat> {
    let mut order: Vec<Tag> = Vec::new();
    let mut totals: HashMap<Tag, (usize, u64)> = HashMap::new();

    for entry in entries {
        let Some(mood) = entry.valid_mood() else {
            continue;
        };
        for (i, tag) in entry.tags.iter().enumerate() {
            if entry.tags[..i].contains(tag) {
                continue;
            }
            let slot = totals.entry(*tag).or_insert_with(|| {
                order.push(*tag);
                (0, 0)
            });
            slot.0 += 1;
            slot.1 += u64::from(mood);
        }
    }

    let mut stats: Vec<TagStat> = order
        .into_iter()
        .map(|tag| {
            let (count, sum) = totals[&tag];
            TagStat {
                tag,
                count,
                average_mood: sum as f64 / count as f64,
            }
        })
        .collect();

    // Stable sort preserves first-seen order among equal counts
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats.truncate(TOP_TAGS);
    stats
}

/// The first `limit` entries in the given order
pub fn recent_entries(entries: &[MoodEntry], limit: usize) -> &[MoodEntry] {
    &entries[..limit.min(entries.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::entry;

    #[test]
    fn test_reference_scenario() {
        let entries = vec![
            entry("2024-01-01", 5, &[]),
            entry("2024-01-02", 3, &[]),
            entry("2024-01-03", 3, &[]),
        ];
        let stats = overall_stats(&entries).unwrap();

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.average_mood, 3.7);
        assert_eq!(stats.mood_counts, BTreeMap::from([(3, 2), (5, 1)]));
        assert_eq!(stats.most_common_mood, 3);
    }

    #[test]
    fn test_average_rounding() {
        let entries = vec![
            entry("2024-01-01", 5, &[]),
            entry("2024-01-02", 5, &[]),
            entry("2024-01-03", 4, &[]),
        ];
        assert_eq!(overall_stats(&entries).unwrap().average_mood, 4.7);

        // 3.65 must round up to 3.7
        assert_eq!(mean_one_decimal(73, 20), Some(3.7));
        // 3.25 rounds up to 3.3
        assert_eq!(mean_one_decimal(13, 4), Some(3.3));
        assert_eq!(mean_one_decimal(0, 0), None);
    }

    #[test]
    fn test_empty_is_absent() {
        assert!(overall_stats(&[]).is_none());
        assert!(tag_stats(&[]).is_empty());
    }

    #[test]
    fn test_most_common_tie_goes_to_higher_mood() {
        let entries = vec![
            entry("2024-01-01", 2, &[]),
            entry("2024-01-02", 4, &[]),
            entry("2024-01-03", 2, &[]),
            entry("2024-01-04", 4, &[]),
        ];
        assert_eq!(overall_stats(&entries).unwrap().most_common_mood, 4);

        // Input order does not matter
        let reversed: Vec<_> = entries.into_iter().rev().collect();
        assert_eq!(overall_stats(&reversed).unwrap().most_common_mood, 4);

        let all_once: Vec<_> = (1..=5)
            .map(|m| entry(&format!("2024-02-0{}", m), m, &[]))
            .collect();
        assert_eq!(overall_stats(&all_once).unwrap().most_common_mood, 5);
    }

    #[test]
    fn test_strict_majority_wins() {
        let entries = vec![
            entry("2024-01-01", 1, &[]),
            entry("2024-01-02", 1, &[]),
            entry("2024-01-03", 5, &[]),
        ];
        assert_eq!(overall_stats(&entries).unwrap().most_common_mood, 1);
    }

    #[test]
    fn test_malformed_entries_are_excluded() {
        let entries = vec![
            entry("2024-01-01", 4, &[Tag::Work]),
            entry("2024-01-02", 0, &[Tag::Work]),
            entry("2024-01-03", 42, &[Tag::Sleep]),
        ];
        let stats = overall_stats(&entries).unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.average_mood, 4.0);

        let tags = tag_stats(&entries);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag, Tag::Work);
        assert_eq!(tags[0].count, 1);

        assert!(overall_stats(&[entry("2024-01-01", 0, &[])]).is_none());
    }

    #[test]
    fn test_good_day_ratio() {
        let entries = vec![
            entry("2024-01-01", 5, &[]),
            entry("2024-01-02", 4, &[]),
            entry("2024-01-03", 2, &[]),
            entry("2024-01-04", 3, &[]),
        ];
        let stats = overall_stats(&entries).unwrap();
        assert_eq!(stats.good_days(), 2);
        assert_eq!(stats.good_day_ratio(), 0.5);
        assert_eq!(stats.count_of(1), 0);
    }

    #[test]
    fn test_tag_stats_contributions() {
        let entries = vec![
            entry("2024-01-01", 5, &[Tag::Exercise, Tag::Social]),
            entry("2024-01-02", 2, &[Tag::Work, Tag::Stress]),
            entry("2024-01-03", 3, &[Tag::Work]),
            entry("2024-01-04", 4, &[Tag::Exercise, Tag::Exercise]),
        ];
        let tags = tag_stats(&entries);

        let exercise = tags.iter().find(|t| t.tag == Tag::Exercise).unwrap();
        assert_eq!(exercise.count, 2);
        assert_eq!(exercise.average_mood, 4.5);

        let work = tags.iter().find(|t| t.tag == Tag::Work).unwrap();
        assert_eq!(work.count, 2);
        assert_eq!(work.average_mood, 2.5);

        // Exercise and Work tie at 2; Exercise was seen first
        assert_eq!(tags[0].tag, Tag::Exercise);
        assert_eq!(tags[1].tag, Tag::Work);
        // Social and Stress tie at 1 in first-seen order
        assert_eq!(tags[2].tag, Tag::Social);
        assert_eq!(tags[3].tag, Tag::Stress);
    }

    #[test]
    fn test_tag_stats_truncated_and_sorted() {
        let entries: Vec<_> = Tag::all()
            .iter()
            .enumerate()
            .flat_map(|(i, tag)| {
                (0..=i).map(move |n| entry(&format!("2024-01-{:02}", n + 1), 3, &[*tag]))
            })
            .collect();
        let tags = tag_stats(&entries);

        assert_eq!(tags.len(), TOP_TAGS);
        assert!(tags.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(tags[0].tag, Tag::Money);
        assert_eq!(tags[0].count, 12);
    }

    #[test]
    fn test_recent_entries() {
        let entries = vec![
            entry("2024-01-03", 3, &[]),
            entry("2024-01-02", 4, &[]),
            entry("2024-01-01", 5, &[]),
        ];
        assert_eq!(recent_entries(&entries, 2).len(), 2);
        assert_eq!(recent_entries(&entries, 2)[0].mood, 3);
        assert_eq!(recent_entries(&entries, 10).len(), 3);
        assert!(recent_entries(&[], 5).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let entries = vec![
            entry("2024-01-01", 5, &[Tag::Food]),
            entry("2024-01-02", 1, &[Tag::Food, Tag::Money]),
        ];
        assert_eq!(overall_stats(&entries), overall_stats(&entries));
        assert_eq!(tag_stats(&entries), tag_stats(&entries));
    }
}
