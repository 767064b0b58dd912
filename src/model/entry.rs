//! Mood entry records
//!
//! A `MoodEntry` is one user-submitted mood for one calendar day. Entries are
//! created by the store from a `NewEntry` and modified with an `EntryPatch`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// Lowest valid mood level
pub const MIN_MOOD: u8 = 1;

/// Highest valid mood level
pub const MAX_MOOD: u8 = 5;

/// Soft limit on note length, enforced at the API boundary
pub const MAX_NOTE_CHARS: usize = 500;

/// A single mood record
///
/// `mood` is kept as the raw stored integer. Well-formed entries carry a value
/// in `MIN_MOOD..=MAX_MOOD`; anything else (including a missing field, which
/// deserializes as 0) is malformed and skipped by every aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    /// Store-assigned identifier
    pub id: String,
    /// Owner of the entry
    pub user_id: String,
    /// Mood level, 5 = best
    #[serde(default)]
    pub mood: u8,
    /// Day the mood applies to
    pub date: NaiveDate,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Last modification instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Influences on the mood, no duplicates
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl MoodEntry {
    /// The mood level if it is within range
    pub fn valid_mood(&self) -> Option<u8> {
        is_valid_mood(self.mood).then_some(self.mood)
    }

    /// Whether this entry takes part in statistics
    pub fn is_well_formed(&self) -> bool {
        self.valid_mood().is_some()
    }

    /// A "good day" has mood 4 or 5
    pub fn is_good_day(&self) -> bool {
        self.valid_mood().map(|m| m >= 4).unwrap_or(false)
    }

    /// Check if this entry carries a tag
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Check a raw mood value against the valid range
pub fn is_valid_mood(mood: u8) -> bool {
    (MIN_MOOD..=MAX_MOOD).contains(&mood)
}

/// Input of "submit mood entry"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    pub mood: u8,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl NewEntry {
    /// Create an entry input with just a mood
    pub fn new(mood: u8) -> Self {
        Self {
            mood,
            note: None,
            tags: Vec::new(),
        }
    }

    /// Builder method: set the note
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builder method: add a tag
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// Partial update of an existing entry
///
/// `note: Some(None)` clears the note, `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl EntryPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.mood.is_none() && self.note.is_none() && self.tags.is_none()
    }
}

/// Remove duplicate tags, keeping the first occurrence
pub fn dedup_tags(tags: &[Tag]) -> Vec<Tag> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(tag) {
            seen.push(*tag);
        }
    }
    seen
}

/// Distinguishes an absent field from an explicit `null`
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mood: u8) -> MoodEntry {
        MoodEntry {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            mood,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            timestamp: "2024-01-01T09:00:00Z".parse().unwrap(),
            updated_at: None,
            note: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_valid_mood_range() {
        assert_eq!(entry(1).valid_mood(), Some(1));
        assert_eq!(entry(5).valid_mood(), Some(5));
        assert_eq!(entry(0).valid_mood(), None);
        assert_eq!(entry(6).valid_mood(), None);
    }

    #[test]
    fn test_good_day() {
        assert!(entry(4).is_good_day());
        assert!(entry(5).is_good_day());
        assert!(!entry(3).is_good_day());
        assert!(!entry(9).is_good_day());
    }

    #[test]
    fn test_entry_wire_format() {
        let json = serde_json::to_string(&entry(4)).unwrap();
        assert!(json.contains("\"userId\":\"u1\""));
        assert!(json.contains("\"date\":\"2024-01-01\""));
        assert!(!json.contains("updatedAt"));
    }

    #[test]
    fn test_missing_mood_is_malformed() {
        let json = r#"{"id":"x","userId":"u","date":"2024-02-03","timestamp":"2024-02-03T10:00:00Z"}"#;
        let parsed: MoodEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.mood, 0);
        assert!(!parsed.is_well_formed());
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_patch_note_null_clears() {
        let patch: EntryPatch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(patch.note, Some(None));

        let patch: EntryPatch = serde_json::from_str(r#"{"mood": 3}"#).unwrap();
        assert_eq!(patch.note, None);
        assert_eq!(patch.mood, Some(3));
        assert!(!patch.is_empty());
        assert!(EntryPatch::default().is_empty());
    }

    #[test]
    fn test_dedup_tags() {
        let tags = dedup_tags(&[Tag::Work, Tag::Sleep, Tag::Work]);
        assert_eq!(tags, vec![Tag::Work, Tag::Sleep]);
    }
}
