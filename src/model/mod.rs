//! Moodtrack Data Model
//!
//! Core record types shared by the store, the aggregation engine and the API:
//!
//! - **entry**: `MoodEntry` plus the `NewEntry` / `EntryPatch` write inputs
//! - **level**: the static five-level mood table
//! - **tag**: the fixed tag vocabulary
//! - **calendar**: `YearMonth` for month-scoped views

pub mod calendar;
pub mod entry;
pub mod level;
pub mod tag;

pub use calendar::{YearMonth, YearMonthParseError};
pub use entry::{
    dedup_tags, is_valid_mood, EntryPatch, MoodEntry, NewEntry, MAX_MOOD, MAX_NOTE_CHARS, MIN_MOOD,
};
pub use level::{MoodLevel, MOOD_LEVELS};
pub use tag::{Tag, TagParseError};
