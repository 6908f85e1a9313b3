//! Plumbing shared by the transport front-ends: inbound frame handling, the
//! bus bridge, and delayed history replay.

use parley_bus::EventBus;
use parley_registry::Registry;
use parley_types::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Processes one decoded-or-not inbound frame from a connection.
///
/// A decode failure is answered with a single error-content message to the
/// offending connection only; nothing is broadcast, published, or stored, and
/// the connection stays open. A decoded message with content is broadcast to
/// the other local connections and then published on the bus, carrying this
/// front-end's instance id both ways.
pub fn handle_inbound_frame(
    registry: &Registry,
    bus: &EventBus,
    id: &str,
    raw: &str,
    reply: &mpsc::UnboundedSender<String>,
) {
    match Message::decode(raw) {
        Ok(decoded) => {
            let message = registry.receive_message(id, decoded);
            if message.has_content() {
                registry.send_to_other_users(&message);
                bus.publish(message);
            }
        }
        Err(e) => {
            debug!(client_id = %id, error = %e, "undecodable frame");
            if let Ok(frame) = Message::error(e.to_string()).encode() {
                let _ = reply.send(frame);
            }
        }
    }
}

/// Bridges bus traffic into a front-end's local connections.
///
/// Messages whose origin is this front-end were already delivered locally
/// when they came in and are discarded; everything else is written to every
/// local connection, since none of them has seen it yet.
pub fn spawn_bus_bridge(registry: Arc<Registry>, bus: EventBus) -> JoinHandle<()> {
    // Subscribe before spawning so nothing published in the meantime is lost.
    let mut messages = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match messages.recv().await {
                Ok(message) => {
                    if message.origin() == Some(registry.instance_id()) {
                        continue;
                    }
                    registry.publish_message(&message);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        skipped,
                        instance_id = %registry.instance_id(),
                        "front-end lagged behind the bus"
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Schedules the one-shot history replay for a new connection.
///
/// Sleeps for `delay`, requests the history snapshot, and writes each entry
/// in order through the connection's frame handle. The handle is a FIFO
/// shared with the assignment notice, so the client always learns its id
/// before seeing history. If the connection has closed, the sends fail and
/// replay quietly stops; if the bus cannot answer, the connection simply gets
/// no history.
pub fn schedule_replay(
    handle: mpsc::UnboundedSender<String>,
    bus: EventBus,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match bus.read_history().await {
            Ok(history) => {
                for message in history {
                    if let Ok(frame) = message.encode() {
                        if handle.send(frame).is_err() {
                            return;
                        }
                    }
                }
            }
            Err(e) => debug!(error = %e, "no history available, skipping replay"),
        }
    })
}
