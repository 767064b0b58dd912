//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::store::EntryStore;
use crate::suggest::MoodSuggester;
use crate::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Entry store for reading/writing mood entries
    pub store: Arc<EntryStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for live updates
    pub ws_hub: Arc<ConnectionHub>,
    /// Mood suggestions, `None` when disabled
    pub suggester: Option<Arc<dyn MoodSuggester>>,
}

impl AppState {
    /// Create a new AppState without a suggester
    pub fn new(store: Arc<EntryStore>, config: ApiConfig) -> Self {
        Self::with_ws_config(store, config, HubConfig::default())
    }

    /// Create AppState with custom WebSocket hub configuration
    pub fn with_ws_config(store: Arc<EntryStore>, config: ApiConfig, hub_config: HubConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
            suggester: None,
        }
    }

    /// Enable mood suggestions
    pub fn with_suggester(mut self, suggester: Arc<dyn MoodSuggester>) -> Self {
        self.suggester = Some(suggester);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
