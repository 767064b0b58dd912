//! Suggestion Routes
//!
//! - POST /api/v1/suggest - Propose a mood level (simulated camera detection)

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::SuggestResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::UserId;
use crate::api::state::AppState;
use crate::suggest::SuggestError;

/// POST /api/v1/suggest
///
/// Nothing is stored; the client submits the accepted mood as a normal entry.
pub async fn suggest_mood(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<SuggestResponse>> {
    let suggester = state
        .suggester
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("mood suggestions are disabled".to_string()))?;

    let suggestion = suggester.suggest().await.map_err(|e| match e {
        SuggestError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
        SuggestError::Failed(msg) => ApiError::Internal(msg),
    })?;

    tracing::info!(
        user_id = %user.as_str(),
        suggester = suggester.name(),
        mood = suggestion.mood,
        "Suggested mood"
    );

    let level = suggestion
        .level()
        .ok_or_else(|| ApiError::Internal(format!("suggested mood {} out of range", suggestion.mood)))?;

    Ok(Json(SuggestResponse {
        mood: suggestion.mood,
        confidence: suggestion.confidence,
        label: level.label.to_string(),
        emoji: level.emoji.to_string(),
    }))
}
