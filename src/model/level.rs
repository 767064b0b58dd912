//! Mood level descriptors
//!
//! Static table mapping levels 1..=5 to a label, an emoji and a display
//! weight. Not derived from data.

use serde::Serialize;

/// Describes one mood level
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MoodLevel {
    pub level: u8,
    pub label: &'static str,
    pub emoji: &'static str,
    /// Relative weight used for chart scaling (level / 5)
    pub weight: f64,
}

/// The five levels, best first
pub const MOOD_LEVELS: [MoodLevel; 5] = [
    MoodLevel {
        level: 5,
        label: "Excellent",
        emoji: "😄",
        weight: 1.0,
    },
    MoodLevel {
        level: 4,
        label: "Good",
        emoji: "😊",
        weight: 0.8,
    },
    MoodLevel {
        level: 3,
        label: "Okay",
        emoji: "😐",
        weight: 0.6,
    },
    MoodLevel {
        level: 2,
        label: "Bad",
        emoji: "😔",
        weight: 0.4,
    },
    MoodLevel {
        level: 1,
        label: "Terrible",
        emoji: "😢",
        weight: 0.2,
    },
];

impl MoodLevel {
    /// Look up a level, `None` when out of range
    pub fn of(level: u8) -> Option<&'static MoodLevel> {
        MOOD_LEVELS.iter().find(|l| l.level == level)
    }

    /// Label for a raw mood value, "Unknown" when out of range
    pub fn label_for(level: u8) -> &'static str {
        Self::of(level).map(|l| l.label).unwrap_or("Unknown")
    }
}
