//! WebSocket Connection Hub
//!
//! Manages all WebSocket connections, subscriptions, and message broadcasting.
//! Every connection belongs to one user and may only subscribe to that user's
//! topics plus `system`.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::{dashboard_topic, entries_topic, ServerMessage, WsEvent, SYSTEM_TOPIC};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections and subscriptions
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Topic subscriptions: Topic → Set of ConnectionIds
    subscriptions: RwLock<HashMap<String, HashSet<ConnectionId>>>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Owner of the connection
    pub user_id: String,
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Topics this connection is subscribed to
    pub subscriptions: HashSet<String>,
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new WebSocket connection for a user
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        user_id: &str,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                user_id: user_id.to_string(),
                sender,
                subscriptions: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, user_id = %user_id, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection and clean up its subscriptions
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(handle) = handle {
            let mut subs = self.subscriptions.write().await;
            for topic in handle.subscriptions {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, "WebSocket disconnected");
    }

    /// Subscribe a connection to topics
    ///
    /// Topics the connection may not see are skipped; the accepted ones are
    /// returned.
    pub async fn subscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let mut subs = self.subscriptions.write().await;
        let mut subscribed = Vec::new();

        for topic in topics {
            if !is_allowed_topic(&topic, &handle.user_id) {
                tracing::warn!(connection_id = %id, topic = %topic, "Topic not allowed, ignored");
                continue;
            }

            handle.subscriptions.insert(topic.clone());
            subs.entry(topic.clone())
                .or_insert_with(HashSet::new)
                .insert(id.to_string());

            subscribed.push(topic);
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?subscribed,
            "Subscribed to topics"
        );

        Ok(subscribed)
    }

    /// Unsubscribe a connection from topics
    pub async fn unsubscribe(
        &self,
        id: &str,
        topics: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections
            .get_mut(id)
            .ok_or(HubError::ConnectionNotFound)?;

        let mut subs = self.subscriptions.write().await;
        let mut unsubscribed = Vec::new();

        for topic in topics {
            if handle.subscriptions.remove(&topic) {
                if let Some(subscribers) = subs.get_mut(&topic) {
                    subscribers.remove(id);
                    if subscribers.is_empty() {
                        subs.remove(&topic);
                    }
                }
                unsubscribed.push(topic);
            }
        }

        tracing::debug!(
            connection_id = %id,
            topics = ?unsubscribed,
            "Unsubscribed from topics"
        );

        Ok(unsubscribed)
    }

    /// Send an event to all subscribers of its topic
    ///
    /// Returns how many connections accepted the message.
    pub async fn broadcast(&self, event: &WsEvent) -> usize {
        // Writers lock connections before subscriptions; never hold both here
        let subscriber_ids: Vec<ConnectionId> = match self.subscriptions.read().await.get(&event.topic) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return 0,
        };

        let connections = self.connections.read().await;
        let mut sent_count = 0;
        for id in &subscriber_ids {
            if let Some(handle) = connections.get(id) {
                if handle.sender.send(event.message.clone()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        if sent_count > 0 {
            tracing::trace!(
                topic = %event.topic,
                subscribers = sent_count,
                "Broadcast event"
            );
        }
        sent_count
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Get subscription count for a topic
    pub async fn subscription_count(&self, topic: &str) -> usize {
        self.subscriptions
            .read()
            .await
            .get(topic)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Whether anyone listens to a user's snapshot or dashboard topics
    pub async fn has_user_subscribers(&self, user_id: &str) -> bool {
        let subs = self.subscriptions.read().await;
        subs.contains_key(&entries_topic(user_id)) || subs.contains_key(&dashboard_topic(user_id))
    }
}

/// A user may see `system` and their own `entries.` / `dashboard.` topics
fn is_allowed_topic(topic: &str, user_id: &str) -> bool {
    topic == SYSTEM_TOPIC || topic == entries_topic(user_id) || topic == dashboard_topic(user_id)
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 1000);
    }

    #[test]
    fn test_allowed_topics() {
        assert!(is_allowed_topic("entries.alice", "alice"));
        assert!(is_allowed_topic("dashboard.alice", "alice"));
        assert!(is_allowed_topic("system", "alice"));

        assert!(!is_allowed_topic("entries.bob", "alice"));
        assert!(!is_allowed_topic("entries.*", "alice"));
        assert!(!is_allowed_topic("", "alice"));
        assert!(!is_allowed_topic("random.topic", "alice"));
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register("alice", tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register("alice", tx).await.unwrap();

        let subscribed = hub
            .subscribe(
                &id,
                vec!["entries.alice".to_string(), "entries.bob".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(subscribed, vec!["entries.alice"]);
        assert_eq!(hub.subscription_count("entries.alice").await, 1);
        assert_eq!(hub.subscription_count("entries.bob").await, 0);
        assert!(hub.has_user_subscribers("alice").await);

        let unsubscribed = hub
            .unsubscribe(&id, vec!["entries.alice".to_string()])
            .await
            .unwrap();
        assert_eq!(unsubscribed, vec!["entries.alice"]);
        assert_eq!(hub.subscription_count("entries.alice").await, 0);
        assert!(!hub.has_user_subscribers("alice").await);

        hub.unregister(&id).await;
    }

    #[tokio::test]
    async fn test_unknown_connection() {
        let hub = ConnectionHub::new(HubConfig::default());
        let result = hub.subscribe("missing", vec!["system".to_string()]).await;
        assert!(matches!(result, Err(HubError::ConnectionNotFound)));
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig { max_connections: 2 });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        let id1 = hub.register("a", tx1).await.unwrap();
        let id2 = hub.register("b", tx2).await.unwrap();
        let result = hub.register("c", tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));

        hub.unregister(&id1).await;
        hub.unregister(&id2).await;
    }

    #[tokio::test]
    async fn test_broadcast_to_subscribers() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        let id1 = hub.register("alice", tx1).await.unwrap();
        let id2 = hub.register("bob", tx2).await.unwrap();

        hub.subscribe(&id1, vec!["entries.alice".to_string()])
            .await
            .unwrap();
        hub.subscribe(&id2, vec!["entries.bob".to_string()])
            .await
            .unwrap();

        let event = WsEvent::snapshot("alice", Arc::new(Vec::new()));
        assert_eq!(hub.broadcast(&event).await, 1);

        assert!(matches!(
            rx1.try_recv(),
            Ok(ServerMessage::Snapshot { .. })
        ));
        assert!(rx2.try_recv().is_err());

        hub.unregister(&id1).await;
        hub.unregister(&id2).await;
    }

    #[tokio::test]
    async fn test_system_reaches_everyone_subscribed() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let id1 = hub.register("alice", tx1).await.unwrap();
        let id2 = hub.register("bob", tx2).await.unwrap();

        hub.subscribe(&id1, vec!["system".to_string()]).await.unwrap();
        hub.subscribe(&id2, vec!["system".to_string()]).await.unwrap();

        assert_eq!(hub.broadcast(&WsEvent::system("hello")).await, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_broadcast_concurrent_with_subscribe() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("alice", tx).await.unwrap();
        hub.subscribe(&id, vec!["system".to_string()]).await.unwrap();

        let broadcaster = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for _ in 0..2000 {
                    hub.broadcast(&WsEvent::system("tick")).await;
                }
            })
        };
        let subscriber = {
            let hub = Arc::clone(&hub);
            let id = id.clone();
            tokio::spawn(async move {
                for _ in 0..2000 {
                    hub.subscribe(&id, vec!["entries.alice".to_string()])
                        .await
                        .unwrap();
                    hub.unsubscribe(&id, vec!["entries.alice".to_string()])
                        .await
                        .unwrap();
                }
            })
        };

        tokio::time::timeout(std::time::Duration::from_secs(30), async {
            broadcaster.await.unwrap();
            subscriber.await.unwrap();
        })
        .await
        .expect("broadcast and subscribe should not block each other");

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2000);
        assert_eq!(hub.subscription_count("entries.alice").await, 0);
    }
}
