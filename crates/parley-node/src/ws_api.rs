//! WebSocket front-end for the relay.
//!
//! This module provides the WebSocket endpoints:
//!
//! - `/ws` - Main WebSocket endpoint, one JSON wire frame per text message
//! - `/api/relay/stats` - Statistics about relay connections
//!
//! ## Protocol
//!
//! On connect the client receives its id assignment, then (after a short
//! delay) the recent history:
//!
//! ```json
//! {"clientId": "8e9f…"}
//! {"message": "hello", "time": 1700000000000, "fromClientId": "41ac…"}
//! ```
//!
//! Anything the client sends with a non-empty `message` key is relayed to
//! every other connected client on both transports.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use parley_bus::EventBus;
use parley_registry::Registry;
use parley_types::{Message, MAX_FRAME_BYTES};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::relay;

/// State shared across WebSocket handlers: this front-end's registry and the
/// bus handle.
#[derive(Clone)]
pub struct AppState {
    /// The front-end's connection registry.
    pub registry: Arc<Registry>,
    /// Shared event bus.
    pub bus: EventBus,
    /// Delay before history replay for a new connection.
    pub replay_delay: Duration,
}

impl AppState {
    /// Creates the state for a fresh front-end instance.
    pub fn new(bus: EventBus, replay_delay: Duration) -> Self {
        Self {
            registry: Arc::new(Registry::new(uuid::Uuid::new_v4().to_string())),
            bus,
            replay_delay,
        }
    }
}

/// Create the relay API routes.
pub fn relay_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/relay/stats", get(get_stats))
}

/// Serves the WebSocket front-end on an already-bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    info!(
        addr = %listener.local_addr()?,
        instance_id = %state.registry.instance_id(),
        "WebSocket front-end listening"
    );

    relay::spawn_bus_bridge(state.registry.clone(), state.bus.clone());

    let app = relay_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    axum::serve(listener, app).await?;
    Ok(())
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_frame_size(MAX_FRAME_BYTES)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let AppState {
        registry,
        bus,
        replay_delay,
    } = state;

    let id = Registry::generate_client_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Queue the assignment notice first, then register; the frame handle is
    // a FIFO, so the id always precedes replayed history and live traffic.
    if let Ok(frame) = Message::assignment(id.clone()).encode() {
        let _ = tx.send(frame);
    }
    registry.add_socket(id.clone(), tx.clone());
    info!(client_id = %id, "WebSocket client connected");

    // Split the socket and forward queued frames to the client.
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let send_id = id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
        debug!(client_id = %send_id, "send task ended");
    });

    relay::schedule_replay(tx.clone(), bus.clone(), replay_delay);

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                relay::handle_inbound_frame(&registry, &bus, &id, &text, &tx);
            }
            Ok(WsMessage::Close(_)) => {
                debug!(client_id = %id, "WebSocket close received");
                break;
            }
            Ok(WsMessage::Ping(data)) => {
                // Axum answers the pong itself.
                debug!(client_id = %id, len = data.len(), "ping received");
            }
            Ok(WsMessage::Pong(_)) => {}
            Ok(WsMessage::Binary(_)) => {
                debug!(client_id = %id, "binary frame ignored");
            }
            Err(e) => {
                debug!(client_id = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    send_task.abort();
    registry.remove_socket(&id);
    info!(client_id = %id, "WebSocket client disconnected");
}

/// Statistics response.
#[derive(Serialize)]
struct StatsResponse {
    current_connections: usize,
    total_connections: u64,
    total_messages_relayed: u64,
}

/// Get relay connection statistics for this front-end.
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.registry.stats();
    Json(StatsResponse {
        current_connections: stats.current_connections,
        total_connections: stats.total_connections,
        total_messages_relayed: stats.total_messages_relayed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialization() {
        let stats = StatsResponse {
            current_connections: 2,
            total_connections: 10,
            total_messages_relayed: 100,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"current_connections\":2"));
        assert!(json.contains("\"total_messages_relayed\":100"));
    }
}
