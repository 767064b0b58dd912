//! Analytics Routes
//!
//! - GET /api/v1/stats - Global statistics
//! - GET /api/v1/tags - Per-tag statistics (top 8)
//! - GET /api/v1/levels - Mood level table and tag vocabulary

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{LevelsResponse, StatsResponse, TagStatsResponse};
use crate::api::error::ApiResult;
use crate::api::extract::UserId;
use crate::api::state::AppState;
use crate::engine::{overall_stats, tag_stats, MoodStats};
use crate::model::{Tag, MOOD_LEVELS};

/// GET /api/v1/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<StatsResponse>> {
    let entries = state.store.list(user.as_str())?;
    let stats = overall_stats(&entries);
    let good_day_ratio = stats.as_ref().map(MoodStats::good_day_ratio);

    Ok(Json(StatsResponse {
        stats,
        good_day_ratio,
    }))
}

/// GET /api/v1/tags
pub async fn tags(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> ApiResult<Json<TagStatsResponse>> {
    let entries = state.store.list(user.as_str())?;
    Ok(Json(TagStatsResponse {
        tags: tag_stats(&entries),
    }))
}

/// GET /api/v1/levels
///
/// Static, but scoped like every other route.
pub async fn levels(_user: UserId) -> Json<LevelsResponse> {
    Json(LevelsResponse {
        levels: &MOOD_LEVELS,
        tags: Tag::all(),
    })
}
