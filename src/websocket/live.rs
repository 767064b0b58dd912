//! Live updates
//!
//! Forwards every store snapshot to WebSocket subscribers: the snapshot
//! itself on `entries.{user}` and a dashboard recomputed from it on
//! `dashboard.{user}`.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::hub::ConnectionHub;
use super::messages::WsEvent;
use crate::engine::{self, DEFAULT_RECENT_LIMIT};
use crate::store::{EntrySnapshot, EntryStore};

/// Start the bridge task
///
/// The task ends when the store is dropped.
pub fn spawn_live_updates(store: &EntryStore, hub: Arc<ConnectionHub>) -> JoinHandle<()> {
    let rx = store.subscribe();
    tokio::spawn(run(rx, hub))
}

async fn run(mut rx: broadcast::Receiver<EntrySnapshot>, hub: Arc<ConnectionHub>) {
    tracing::info!("Live update bridge started");

    loop {
        match rx.recv().await {
            Ok(snapshot) => {
                let today = Local::now().date_naive();
                publish_snapshot(&hub, &snapshot, today).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                // Skipped users catch up on their next write or resubscribe
                tracing::warn!(skipped, "Live update bridge lagged, skipping stale snapshots");
                hub.broadcast(&WsEvent::system("Live updates lagged; some snapshots were skipped"))
                    .await;
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::info!("Live update bridge stopped");
}

/// Publish one snapshot and its dashboard
///
/// Returns the number of messages delivered.
pub async fn publish_snapshot(
    hub: &ConnectionHub,
    snapshot: &EntrySnapshot,
    today: NaiveDate,
) -> usize {
    if !hub.has_user_subscribers(&snapshot.user_id).await {
        return 0;
    }

    let board = engine::dashboard(&snapshot.entries, today, DEFAULT_RECENT_LIMIT);

    let delivered = hub
        .broadcast(&WsEvent::snapshot(
            &snapshot.user_id,
            Arc::clone(&snapshot.entries),
        ))
        .await
        + hub
            .broadcast(&WsEvent::dashboard(&snapshot.user_id, board))
            .await;

    tracing::debug!(
        user_id = %snapshot.user_id,
        entries = snapshot.len(),
        delivered,
        "Published live update"
    );
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use crate::websocket::{HubConfig, ServerMessage};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_publish_snapshot_reaches_both_topics() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("alice", tx).await.unwrap();
        hub.subscribe(
            &id,
            vec!["entries.alice".to_string(), "dashboard.alice".to_string()],
        )
        .await
        .unwrap();

        let entries = vec![crate::engine::testutil::entry("2024-01-10", 4, &[])];
        let snapshot = EntrySnapshot::new("alice", entries);
        let today = crate::engine::testutil::day("2024-01-10");

        assert_eq!(publish_snapshot(&hub, &snapshot, today).await, 2);
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Snapshot { .. })));
        match rx.try_recv() {
            Ok(ServerMessage::Dashboard { dashboard, .. }) => {
                assert_eq!(dashboard.today, today);
                assert_eq!(dashboard.stats.unwrap().total_entries, 1);
            }
            other => panic!("Expected Dashboard, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_skips_unwatched_users() {
        let hub = ConnectionHub::new(HubConfig::default());
        let snapshot = EntrySnapshot::new("nobody", Vec::new());
        let today = crate::engine::testutil::day("2024-01-10");
        assert_eq!(publish_snapshot(&hub, &snapshot, today).await, 0);
    }

    #[tokio::test]
    async fn test_bridge_forwards_store_writes() {
        let store = EntryStore::open_in_memory().unwrap();
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register("alice", tx).await.unwrap();
        hub.subscribe(&id, vec!["entries.alice".to_string()])
            .await
            .unwrap();

        let handle = spawn_live_updates(&store, Arc::clone(&hub));
        store.create("alice", NewEntry::new(5)).unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match msg {
            ServerMessage::Snapshot { user_id, entries } => {
                assert_eq!(user_id, "alice");
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].mood, 5);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        drop(store);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
