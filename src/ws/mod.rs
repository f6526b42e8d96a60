pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::protocol::ClientMessage;
use crate::state::AppState;
use crate::types::ConnectionId;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection. Each connection gets a fresh
/// ULID identity for its lifetime; reconnection correlation happens through
/// the client identity inside join messages, not here.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id: ConnectionId = ulid::Ulid::new().to_string();
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    state.connections.write().await.insert(conn_id.clone(), tx);
    tracing::info!(conn = %conn_id, "WebSocket connected");

    loop {
        tokio::select! {
            // Outbound snapshots and signals queued for this connection
            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }

            // Inbound client commands
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => handlers::handle_message(&state, &conn_id, msg).await,
                            Err(e) => {
                                tracing::debug!(conn = %conn_id, error = %e, "discarding unparseable message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(conn = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.connections.write().await.remove(&conn_id);
    state.handle_disconnect(&conn_id).await;
    tracing::info!(conn = %conn_id, "WebSocket disconnected");
}
