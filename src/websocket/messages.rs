//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! clients and the moodtrack server.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::Dashboard;
use crate::model::MoodEntry;

/// Topic carrying every system notice
pub const SYSTEM_TOPIC: &str = "system";

/// Topic with full entry snapshots of one user
pub fn entries_topic(user_id: &str) -> String {
    format!("entries.{}", user_id)
}

/// Topic with recomputed dashboards of one user
pub fn dashboard_topic(user_id: &str) -> String {
    format!("dashboard.{}", user_id)
}

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// e.g. "entries.alice", "dashboard.alice", "system"
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe { topics: Vec<String> },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full entry collection after a change, newest first
    Snapshot {
        user_id: String,
        entries: Arc<Vec<MoodEntry>>,
    },
    /// Dashboard recomputed from the latest snapshot
    Dashboard {
        user_id: String,
        dashboard: Box<Dashboard>,
    },
    /// Server notice
    System { message: String },
    /// Subscription confirmed
    Subscribed {
        /// Topics successfully subscribed to
        topics: Vec<String>,
    },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected {
        connection_id: String,
        user_id: String,
    },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "entries.alice")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// Create a snapshot event
    pub fn snapshot(user_id: &str, entries: Arc<Vec<MoodEntry>>) -> Self {
        Self {
            topic: entries_topic(user_id),
            message: ServerMessage::Snapshot {
                user_id: user_id.to_string(),
                entries,
            },
        }
    }

    /// Create a dashboard event
    pub fn dashboard(user_id: &str, dashboard: Dashboard) -> Self {
        Self {
            topic: dashboard_topic(user_id),
            message: ServerMessage::Dashboard {
                user_id: user_id.to_string(),
                dashboard: Box::new(dashboard),
            },
        }
    }

    /// Create a system event
    pub fn system(message: &str) -> Self {
        Self {
            topic: SYSTEM_TOPIC.to_string(),
            message: ServerMessage::System {
                message: message.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::engine::testutil::{day, entry};

    #[test]
    fn test_client_message_deserialize_subscribe() {
        let json = r#"{"type": "subscribe", "topics": ["entries.alice", "dashboard.alice"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Subscribe { topics } => {
                assert_eq!(topics.len(), 2);
                assert_eq!(topics[0], "entries.alice");
            }
            _ => panic!("Expected Subscribe"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialize_snapshot() {
        let entries = vec![entry("2024-01-10", 4, &[])];
        let event = WsEvent::snapshot("user-1", Arc::new(entries));
        assert_eq!(event.topic, "entries.user-1");

        let json = serde_json::to_value(&event.message).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["entries"][0]["mood"], 4);
        assert_eq!(json["entries"][0]["date"], "2024-01-10");
    }

    #[test]
    fn test_snapshot_message_shares_store_entries() {
        let snapshot = crate::store::EntrySnapshot::new(
            "user-1",
            vec![entry("2024-01-10", 4, &[]), entry("2024-01-09", 2, &[])],
        );
        let event = WsEvent::snapshot("user-1", Arc::clone(&snapshot.entries));
        assert_eq!(Arc::strong_count(&snapshot.entries), 2);

        let json = serde_json::to_value(&event.message).unwrap();
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["mood"], 2);
    }

    #[test]
    fn test_server_message_serialize_dashboard() {
        let entries = vec![entry("2024-01-10", 5, &[])];
        let board = engine::dashboard(&entries, day("2024-01-10"), 3);
        let event = WsEvent::dashboard("user-1", board);
        assert_eq!(event.topic, "dashboard.user-1");

        let json = serde_json::to_value(&event.message).unwrap();
        assert_eq!(json["type"], "dashboard");
        assert_eq!(json["dashboard"]["week"].as_array().unwrap().len(), 7);
        assert_eq!(json["dashboard"]["stats"]["totalEntries"], 1);
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
            user_id: "alice".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }

    #[test]
    fn test_system_event() {
        let event = WsEvent::system("restarting");
        assert_eq!(event.topic, SYSTEM_TOPIC);
        assert!(matches!(event.message, ServerMessage::System { .. }));
    }
}
