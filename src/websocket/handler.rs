//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::ConnectionHub;
use super::messages::{dashboard_topic, entries_topic, ClientMessage, ServerMessage, WsEvent};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::user_id_from_headers;
use crate::api::AppState;
use crate::engine::{self, DEFAULT_RECENT_LIMIT};

/// Browsers cannot set headers on a WebSocket handshake
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /api/v1/ws
///
/// The user comes from `X-User-Id` or the `user_id` query parameter.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<WsParams>,
) -> ApiResult<Response> {
    let user_id = user_id_from_headers(&headers)
        .or_else(|| {
            params
                .user_id
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
        })
        .ok_or_else(|| ApiError::Unauthorized("missing user id".to_string()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: String) {
    let hub = Arc::clone(&state.ws_hub);
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(&user_id, tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    let connected = ServerMessage::Connected {
        connection_id: connection_id.clone(),
        user_id: user_id.clone(),
    };
    if hub.send_to(&connection_id, connected).await.is_err() {
        hub.unregister(&connection_id).await;
        return;
    }

    let conn_id_for_send = connection_id.clone();

    // Task to forward messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    let state_for_recv = Arc::clone(&state);
    let conn_id_for_recv = connection_id.clone();
    let user_for_recv = user_id.clone();

    // Task to receive messages from WebSocket and handle them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&state_for_recv, &conn_id_for_recv, &user_for_recv, msg)
                        .await
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    message: Message,
) -> bool {
    let hub = &state.ws_hub;
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(state, connection_id, user_id, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(connection_id, error_msg).await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}

/// Handle a parsed client message
async fn handle_client_message(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    message: ClientMessage,
) {
    let hub = &state.ws_hub;
    match message {
        ClientMessage::Subscribe { topics } => match hub.subscribe(connection_id, topics).await {
            Ok(subscribed) => {
                let response = ServerMessage::Subscribed {
                    topics: subscribed.clone(),
                };
                let _ = hub.send_to(connection_id, response).await;
                send_current_state(state, hub, connection_id, user_id, &subscribed).await;
            }
            Err(e) => {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "Subscribe error"
                );
                let error_msg = ServerMessage::Error {
                    message: e.to_string(),
                };
                let _ = hub.send_to(connection_id, error_msg).await;
            }
        },
        ClientMessage::Unsubscribe { topics } => {
            match hub.unsubscribe(connection_id, topics).await {
                Ok(unsubscribed) => {
                    let response = ServerMessage::Unsubscribed {
                        topics: unsubscribed,
                    };
                    let _ = hub.send_to(connection_id, response).await;
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "Unsubscribe error"
                    );
                    let error_msg = ServerMessage::Error {
                        message: e.to_string(),
                    };
                    let _ = hub.send_to(connection_id, error_msg).await;
                }
            }
        }
        ClientMessage::Ping => {
            let _ = hub.send_to(connection_id, ServerMessage::Pong).await;
        }
    }
}

/// Send the current snapshot and dashboard for newly subscribed user topics
async fn send_current_state(
    state: &AppState,
    hub: &ConnectionHub,
    connection_id: &str,
    user_id: &str,
    subscribed: &[String],
) {
    let wants_entries = subscribed.contains(&entries_topic(user_id));
    let wants_dashboard = subscribed.contains(&dashboard_topic(user_id));
    if !wants_entries && !wants_dashboard {
        return;
    }

    let snapshot = match state.store.snapshot(user_id) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to load initial snapshot");
            let _ = hub
                .send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: "Failed to load entries".to_string(),
                    },
                )
                .await;
            return;
        }
    };

    if wants_entries {
        let event = WsEvent::snapshot(user_id, Arc::clone(&snapshot.entries));
        let _ = hub.send_to(connection_id, event.message).await;
    }
    if wants_dashboard {
        let today = Local::now().date_naive();
        let board = engine::dashboard(&snapshot.entries, today, DEFAULT_RECENT_LIMIT);
        let event = WsEvent::dashboard(user_id, board);
        let _ = hub.send_to(connection_id, event.message).await;
    }
}
