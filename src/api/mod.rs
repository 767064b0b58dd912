//! Moodtrack REST API
//!
//! HTTP API layer for moodtrack, built with Axum. Every `/api/v1` route is
//! scoped to the user named by the `X-User-Id` header (401 without it).
//!
//! # Endpoints
//!
//! ## Entries
//! - `GET /api/v1/entries?limit=` - List entries, newest first
//! - `POST /api/v1/entries` - Submit a mood entry
//! - `DELETE /api/v1/entries` - Clear all entries
//! - `GET /api/v1/entries/:id` - Get an entry
//! - `PUT /api/v1/entries/:id` - Update an entry
//! - `DELETE /api/v1/entries/:id` - Delete an entry
//! - `GET /api/v1/entries/date/:date` - Entry for a day
//!
//! ## Views
//! - `GET /api/v1/week?date=` - Weekly snapshot
//! - `GET /api/v1/calendar/:year_month?today=` - Month grid
//! - `GET /api/v1/trends?end=&days=` - Rolling series
//! - `GET /api/v1/dashboard?date=&recent=` - Dashboard
//!
//! ## Analytics
//! - `GET /api/v1/stats` - Global statistics
//! - `GET /api/v1/tags` - Tag statistics
//! - `GET /api/v1/levels` - Mood levels and tag vocabulary
//!
//! ## Export
//! - `GET /api/v1/export?format=json|csv|ndjson` - Download all entries
//!
//! ## Suggestions
//! - `POST /api/v1/suggest` - Propose a mood level
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Live snapshots and dashboards
//!
//! # Example
//!
//! ```rust,no_run
//! use moodtrack::api::{serve, AppState};
//! use moodtrack::config::ApiConfig;
//! use moodtrack::store::{EntryStore, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(EntryStore::open(&StoreConfig::new("./data"))?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::{UserId, USER_ID_HEADER};
pub use state::AppState;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::{spawn_live_updates, websocket_handler};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Entry routes
        .route("/entries", get(routes::entries::list_entries))
        .route("/entries", post(routes::entries::create_entry))
        .route("/entries", delete(routes::entries::clear_entries))
        .route("/entries/:id", get(routes::entries::get_entry))
        .route("/entries/:id", put(routes::entries::update_entry))
        .route("/entries/:id", delete(routes::entries::delete_entry))
        .route("/entries/date/:date", get(routes::entries::entry_by_date))
        // View routes
        .route("/week", get(routes::views::week))
        .route("/calendar/:year_month", get(routes::views::calendar))
        .route("/trends", get(routes::views::trends))
        .route("/dashboard", get(routes::views::dashboard))
        // Analytics routes
        .route("/stats", get(routes::analytics::stats))
        .route("/tags", get(routes::analytics::tags))
        .route("/levels", get(routes::analytics::levels))
        // Export routes
        .route("/export", get(routes::export::export_data))
        // Suggestion routes
        .route("/suggest", post(routes::suggest::suggest_mood))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let timeout = TimeoutLayer::new(state.config.request_timeout());
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured origins; permissive when none are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

/// Start the API server
///
/// Runs the live update bridge alongside the server until shutdown.
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let bridge = spawn_live_updates(&state.store, state.ws_hub.clone());
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Moodtrack API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    bridge.abort();
    tracing::info!("Moodtrack API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
