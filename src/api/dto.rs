//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::engine::{DaySlot, MoodStats, SeriesPoint, TagStat};
use crate::model::{EntryPatch, MoodEntry, MoodLevel, NewEntry, Tag, MAX_NOTE_CHARS};

// ============================================
// ENTRY DTOs
// ============================================

/// Entry list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    /// Return at most this many (newest first)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Entry list response
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<MoodEntry>,
    /// Entries the user has in total, before `limit`
    pub total: usize,
}

/// Submit mood entry request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub mood: u8,
    #[serde(default)]
    pub note: Option<String>,
    /// Tag labels, matched case-insensitively
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateEntryRequest {
    pub fn into_new_entry(self) -> ApiResult<NewEntry> {
        if let Some(note) = &self.note {
            validate_note(note)?;
        }
        Ok(NewEntry {
            mood: self.mood,
            note: self.note,
            tags: parse_tags(&self.tags)?,
        })
    }
}

/// Update entry request; absent fields stay unchanged, `"note": null` clears
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default, with = "crate::model::entry::double_option")]
    pub note: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateEntryRequest {
    pub fn into_patch(self) -> ApiResult<EntryPatch> {
        if let Some(Some(note)) = &self.note {
            validate_note(note)?;
        }
        let tags = self.tags.as_deref().map(parse_tags).transpose()?;

        let patch = EntryPatch {
            mood: self.mood,
            note: self.note,
            tags,
        };
        if patch.is_empty() {
            return Err(ApiError::Validation("update changes nothing".to_string()));
        }
        Ok(patch)
    }
}

fn validate_note(note: &str) -> ApiResult<()> {
    let chars = note.chars().count();
    if chars > MAX_NOTE_CHARS {
        return Err(ApiError::Validation(format!(
            "note is {} characters, limit is {}",
            chars, MAX_NOTE_CHARS
        )));
    }
    Ok(())
}

fn parse_tags(labels: &[String]) -> ApiResult<Vec<Tag>> {
    labels
        .iter()
        .map(|label| {
            label
                .parse::<Tag>()
                .map_err(|e| ApiError::Validation(e.to_string()))
        })
        .collect()
}

/// Clear-all response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: usize,
}

// ============================================
// VIEW DTOs
// ============================================

/// `?date=yyyy-MM-dd`, defaults to today
#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    #[serde(default)]
    pub date: Option<String>,
}

/// `?today=yyyy-MM-dd` for the calendar highlight
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    #[serde(default)]
    pub today: Option<String>,
}

/// Trend query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    /// Last day of the series, defaults to today
    #[serde(default)]
    pub end: Option<String>,
    /// Series length (default 30, max 366)
    #[serde(default)]
    pub days: Option<usize>,
}

/// Dashboard query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub date: Option<String>,
    /// Number of recent entries (default 3)
    #[serde(default)]
    pub recent: Option<usize>,
}

/// Weekly snapshot response
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekResponse {
    pub reference_date: NaiveDate,
    pub days: Vec<DaySlot>,
}

/// Rolling series response
#[derive(Debug, Serialize, Deserialize)]
pub struct TrendResponse {
    pub end: NaiveDate,
    pub days: usize,
    pub points: Vec<SeriesPoint>,
}

// ============================================
// ANALYTICS DTOs
// ============================================

/// Global statistics response; `stats` is null without well-formed entries
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: Option<MoodStats>,
    pub good_day_ratio: Option<f64>,
}

/// Tag correlation response
#[derive(Debug, Serialize, Deserialize)]
pub struct TagStatsResponse {
    pub tags: Vec<TagStat>,
}

/// Mood level table and tag vocabulary
#[derive(Debug, Serialize)]
pub struct LevelsResponse {
    pub levels: &'static [MoodLevel],
    pub tags: &'static [Tag],
}

// ============================================
// SUGGEST DTOs
// ============================================

/// Suggested mood with its display descriptor
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub mood: u8,
    pub confidence: f64,
    pub label: String,
    pub emoji: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Store status
    pub store: String,
    /// Entries across all users
    pub entries: Option<usize>,
    pub users: Option<usize>,
    pub ws_connections: usize,
    pub suggest_enabled: bool,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Format: json, csv, ndjson
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_parses_tags() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"mood": 4, "tags": ["work", "Sleep"]}"#).unwrap();
        let new = req.into_new_entry().unwrap();
        assert_eq!(new.mood, 4);
        assert_eq!(new.tags, vec![Tag::Work, Tag::Sleep]);
        assert!(new.note.is_none());
    }

    #[test]
    fn test_create_request_rejects_unknown_tag() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"mood": 4, "tags": ["Gaming"]}"#).unwrap();
        assert!(matches!(req.into_new_entry(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_note_limit() {
        let req = CreateEntryRequest {
            mood: 3,
            note: Some("x".repeat(MAX_NOTE_CHARS)),
            tags: vec![],
        };
        assert!(req.into_new_entry().is_ok());

        let req = CreateEntryRequest {
            mood: 3,
            note: Some("é".repeat(MAX_NOTE_CHARS + 1)),
            tags: vec![],
        };
        assert!(matches!(req.into_new_entry(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_update_request_null_note_clears() {
        let req: UpdateEntryRequest = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.note, Some(None));
        assert!(patch.mood.is_none());

        let req: UpdateEntryRequest = serde_json::from_str(r#"{"mood": 2}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.mood, Some(2));
        assert!(patch.note.is_none());
    }

    #[test]
    fn test_empty_update_rejected() {
        let req: UpdateEntryRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(req.into_patch(), Err(ApiError::Validation(_))));
    }
}
