//! Export Routes
//!
//! Full download of the caller's entries for backup and analysis.
//!
//! - GET /api/v1/export?format=json|csv|ndjson

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate, SecondsFormat};
use std::sync::Arc;

use crate::api::dto::ExportParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::UserId;
use crate::api::state::AppState;
use crate::model::{MoodEntry, MoodLevel};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Ndjson,
}

impl ExportFormat {
    pub fn parse(s: &str) -> ApiResult<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "ndjson" => Ok(ExportFormat::Ndjson),
            other => Err(ApiError::Validation(format!(
                "Unsupported export format '{}' (use json, csv or ndjson)",
                other
            ))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Ndjson => "application/x-ndjson",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Ndjson => "ndjson",
        }
    }
}

/// `mood-tracker-data-YYYY-MM-DD.ext`
pub fn export_filename(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "mood-tracker-data-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// GET /api/v1/export
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let format = ExportFormat::parse(&params.format)?;
    let entries = state.store.list(user.as_str())?;

    let body = match format {
        ExportFormat::Json => format_json(&entries)?,
        ExportFormat::Csv => format_csv(&entries)?,
        ExportFormat::Ndjson => format_ndjson(&entries)?,
    };

    let filename = export_filename(Local::now().date_naive(), format);
    tracing::info!(
        user_id = %user.as_str(),
        entries = entries.len(),
        format = format.extension(),
        "Exported entries"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// Pretty JSON array of wire entries
pub fn format_json(entries: &[MoodEntry]) -> ApiResult<String> {
    serde_json::to_string_pretty(entries)
        .map_err(|e| ApiError::Internal(format!("JSON export failed: {}", e)))
}

/// One wire entry per line
pub fn format_ndjson(entries: &[MoodEntry]) -> ApiResult<String> {
    let mut ndjson = String::new();
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|e| ApiError::Internal(format!("NDJSON export failed: {}", e)))?;
        ndjson.push_str(&line);
        ndjson.push('\n');
    }
    Ok(ndjson)
}

/// CSV with `id,date,timestamp,mood,label,tags,note`; tags are `;`-joined
pub fn format_csv(entries: &[MoodEntry]) -> ApiResult<String> {
    let csv_err = |e: csv::Error| ApiError::Internal(format!("CSV export failed: {}", e));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["id", "date", "timestamp", "mood", "label", "tags", "note"])
        .map_err(csv_err)?;

    for entry in entries {
        let tags = entry
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let date = entry.date.format("%Y-%m-%d").to_string();
        let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mood = entry.mood.to_string();

        writer
            .write_record([
                entry.id.as_str(),
                date.as_str(),
                timestamp.as_str(),
                mood.as_str(),
                MoodLevel::label_for(entry.mood),
                tags.as_str(),
                entry.note.as_deref().unwrap_or(""),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{day, entry};
    use crate::model::Tag;

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("ndjson").unwrap(), ExportFormat::Ndjson);
        assert!(ExportFormat::parse("xml").is_err());
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(day("2024-03-07"), ExportFormat::Json),
            "mood-tracker-data-2024-03-07.json"
        );
    }

    #[test]
    fn test_format_csv() {
        let mut e = entry("2024-01-10", 4, &[Tag::Work, Tag::Sleep]);
        e.note = Some("busy, but fine".to_string());
        let csv = format_csv(&[e]).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,timestamp,mood,label,tags,note"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-01-10-4,2024-01-10,2024-01-10T12:00:00Z,4,Good,Work;Sleep,\"busy, but fine\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_format_ndjson_and_json() {
        let entries = vec![entry("2024-01-10", 4, &[]), entry("2024-01-09", 2, &[])];

        let ndjson = format_ndjson(&entries).unwrap();
        assert_eq!(ndjson.lines().count(), 2);

        let json = format_json(&entries).unwrap();
        let parsed: Vec<MoodEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries);
    }
}
