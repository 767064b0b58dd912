//! Entry Routes
//!
//! CRUD endpoints for the caller's mood entries.
//!
//! - GET /api/v1/entries - List entries, newest first
//! - POST /api/v1/entries - Submit a mood entry
//! - DELETE /api/v1/entries - Delete all of the caller's entries
//! - GET /api/v1/entries/:id - Get one entry
//! - PUT /api/v1/entries/:id - Update mood, note or tags
//! - DELETE /api/v1/entries/:id - Delete one entry
//! - GET /api/v1/entries/date/:date - Entry for a calendar day

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    ClearResponse, CreateEntryRequest, EntryListParams, EntryListResponse, UpdateEntryRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::UserId;
use crate::api::state::AppState;
use crate::engine::{find_by_date, parse_date};
use crate::model::MoodEntry;

/// GET /api/v1/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Query(params): Query<EntryListParams>,
) -> ApiResult<Json<EntryListResponse>> {
    let mut entries = state.store.list(user.as_str())?;
    let total = entries.len();

    if let Some(limit) = params.limit {
        entries.truncate(limit);
    }

    Ok(Json(EntryListResponse { entries, total }))
}

/// POST /api/v1/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Json(req): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<MoodEntry>)> {
    let new = req.into_new_entry()?;
    let entry = state.store.create(user.as_str(), new)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/entries/:id
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<MoodEntry>> {
    state
        .store
        .get(user.as_str(), &id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Entry {} not found", id)))
}

/// PUT /api/v1/entries/:id
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> ApiResult<Json<MoodEntry>> {
    let patch = req.into_patch()?;
    let entry = state.store.update(user.as_str(), &id, patch)?;
    Ok(Json(entry))
}

/// DELETE /api/v1/entries/:id
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete(user.as_str(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/entries
///
/// Removes every entry of the caller.
pub async fn clear_entries(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<ClearResponse>> {
    let removed = state.store.clear(user.as_str())?;
    Ok(Json(ClearResponse { removed }))
}

/// GET /api/v1/entries/date/:date
///
/// First entry (newest first) recorded for the day.
pub async fn entry_by_date(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Path(date): Path<String>,
) -> ApiResult<Json<MoodEntry>> {
    let day = parse_date(&date)
        .ok_or_else(|| ApiError::Validation(format!("date must be yyyy-MM-dd, got '{date}'")))?;

    let entries = state.store.list(user.as_str())?;
    find_by_date(&entries, day)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No entry for {}", day)))
}
