//! API Routes
//!
//! Route handlers organized by functionality.

pub mod analytics;
pub mod entries;
pub mod export;
pub mod health;
pub mod suggest;
pub mod views;

use chrono::{Local, NaiveDate};

use crate::api::error::{ApiError, ApiResult};
use crate::engine::parse_date;

/// Parse an optional date parameter, defaulting to the server's local today
pub(crate) fn date_or_today(value: Option<&str>, name: &str) -> ApiResult<NaiveDate> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).ok_or_else(|| {
            ApiError::Validation(format!("{name} must be yyyy-MM-dd, got '{v}'"))
        }),
        None => Ok(Local::now().date_naive()),
    }
}
