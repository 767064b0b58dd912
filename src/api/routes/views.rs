//! View Routes
//!
//! Calendar projections of the caller's entries.
//!
//! - GET /api/v1/week?date= - Monday-to-Sunday snapshot
//! - GET /api/v1/calendar/:year_month?today= - Month grid with summary
//! - GET /api/v1/trends?end=&days= - Rolling daily series
//! - GET /api/v1/dashboard?date=&recent= - Week, stats and recent entries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use super::date_or_today;
use crate::api::dto::{
    CalendarParams, DashboardParams, DateParams, TrendParams, TrendResponse, WeekResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::UserId;
use crate::api::state::AppState;
use crate::engine::{
    self, month_grid, rolling_series, weekly_snapshot, Dashboard, MonthGrid,
    DEFAULT_RECENT_LIMIT, DEFAULT_SERIES_DAYS,
};
use crate::model::YearMonth;

/// Longest accepted trend window
pub const MAX_TREND_DAYS: usize = 366;

/// Most recent entries a dashboard may include
pub const MAX_RECENT: usize = 50;

/// GET /api/v1/week
pub async fn week(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<WeekResponse>> {
    let reference_date = date_or_today(params.date.as_deref(), "date")?;
    let entries = state.store.list(user.as_str())?;

    Ok(Json(WeekResponse {
        reference_date,
        days: weekly_snapshot(&entries, reference_date).to_vec(),
    }))
}

/// GET /api/v1/calendar/:year_month
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Path(year_month): Path<String>,
    Query(params): Query<CalendarParams>,
) -> ApiResult<Json<MonthGrid>> {
    let year_month: YearMonth = year_month
        .parse()
        .map_err(|e| ApiError::Validation(format!("{}", e)))?;
    let today = date_or_today(params.today.as_deref(), "today")?;
    let entries = state.store.list(user.as_str())?;

    Ok(Json(month_grid(&entries, year_month, today)))
}

/// GET /api/v1/trends
pub async fn trends(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Query(params): Query<TrendParams>,
) -> ApiResult<Json<TrendResponse>> {
    let end = date_or_today(params.end.as_deref(), "end")?;
    let days = params.days.unwrap_or(DEFAULT_SERIES_DAYS);
    if days > MAX_TREND_DAYS {
        return Err(ApiError::Validation(format!(
            "days must be at most {}, got {}",
            MAX_TREND_DAYS, days
        )));
    }

    let entries = state.store.list(user.as_str())?;

    Ok(Json(TrendResponse {
        end,
        days,
        points: rolling_series(&entries, end, days),
    }))
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: UserId,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<Dashboard>> {
    let today = date_or_today(params.date.as_deref(), "date")?;
    let recent = params.recent.unwrap_or(DEFAULT_RECENT_LIMIT).min(MAX_RECENT);
    let entries = state.store.list(user.as_str())?;

    Ok(Json(engine::dashboard(&entries, today, recent)))
}
