//! WebSocket Real-Time Streaming
//!
//! Pushes entry snapshots and recomputed dashboards to clients via WebSocket.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Live**: Bridges store snapshots to hub topics
//! - **Messages**: Defines client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/api/v1/ws` (user from `X-User-Id` or `?user_id=`) and
//! can subscribe to topics:
//! - `entries.{user_id}` - Full entry snapshot after every change
//! - `dashboard.{user_id}` - Dashboard recomputed after every change
//! - `system` - System events
//!
//! Subscribing to a user topic immediately delivers its current state.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8090/api/v1/ws?user_id=alice');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['dashboard.alice']}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```

mod handler;
mod hub;
mod live;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use live::{publish_snapshot, spawn_live_updates};
pub use messages::{
    dashboard_topic, entries_topic, ClientMessage, ServerMessage, WsEvent, SYSTEM_TOPIC,
};
