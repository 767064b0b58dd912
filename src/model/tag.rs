//! Tag vocabulary
//!
//! Entries can only carry labels from this fixed set of twelve influences.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// An influence on the day's mood
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Work,
    Sleep,
    Exercise,
    Food,
    Social,
    Weather,
    Health,
    Stress,
    Family,
    Hobbies,
    Travel,
    Money,
}

impl Tag {
    /// Get all tags in display order
    pub fn all() -> &'static [Tag] {
        &[
            Tag::Work,
            Tag::Sleep,
            Tag::Exercise,
            Tag::Food,
            Tag::Social,
            Tag::Weather,
            Tag::Health,
            Tag::Stress,
            Tag::Family,
            Tag::Hobbies,
            Tag::Travel,
            Tag::Money,
        ]
    }

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Work => "Work",
            Tag::Sleep => "Sleep",
            Tag::Exercise => "Exercise",
            Tag::Food => "Food",
            Tag::Social => "Social",
            Tag::Weather => "Weather",
            Tag::Health => "Health",
            Tag::Stress => "Stress",
            Tag::Family => "Family",
            Tag::Hobbies => "Hobbies",
            Tag::Travel => "Travel",
            Tag::Money => "Money",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label outside the vocabulary
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown tag: {0}")]
pub struct TagParseError(pub String);

impl FromStr for Tag {
    type Err = TagParseError;

    /// Case-insensitive parse of a tag label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tag::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TagParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_size() {
        assert_eq!(Tag::all().len(), 12);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("work".parse::<Tag>(), Ok(Tag::Work));
        assert_eq!(" HOBBIES ".parse::<Tag>(), Ok(Tag::Hobbies));
        assert!("gaming".parse::<Tag>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&vec![Tag::Sleep, Tag::Money]).unwrap();
        assert_eq!(json, r#"["Sleep","Money"]"#);
    }
}
