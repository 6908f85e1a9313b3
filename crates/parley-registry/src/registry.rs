//! Connection registry: lifecycle and addressing of live client connections
//! for one transport front-end.

use crate::client::Client;
use parking_lot::RwLock;
use parley_types::{ClientId, InstanceId, Message};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Tracks the live connections of a single transport front-end and performs
/// local fan-out.
///
/// Each front-end owns exactly one registry; the registry is constructed with
/// the front-end's instance id and stamps it onto every inbound message so
/// the bus can suppress self-echo on the way back.
#[derive(Debug)]
pub struct Registry {
    /// Instance id of the owning front-end.
    instance_id: InstanceId,
    /// Connected clients indexed by id.
    clients: RwLock<HashMap<ClientId, Client>>,
    /// Statistics.
    stats: RwLock<RegistryStats>,
}

impl Registry {
    /// Creates a registry for a front-end instance.
    pub fn new(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            clients: RwLock::new(HashMap::new()),
            stats: RwLock::new(RegistryStats::default()),
        }
    }

    /// Produces a fresh, collision-free client identifier.
    pub fn generate_client_id() -> ClientId {
        uuid::Uuid::new_v4().to_string()
    }

    /// The owning front-end's instance id.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Registers a connection under `id`.
    ///
    /// Ids are freshly generated by the caller; a duplicate registration is
    /// ignored rather than replacing the live connection.
    pub fn add_socket(&self, id: ClientId, sender: mpsc::UnboundedSender<String>) {
        {
            let mut clients = self.clients.write();
            if clients.contains_key(&id) {
                debug!(client_id = %id, "duplicate client id, registration ignored");
                return;
            }
            clients.insert(id.clone(), Client::new(id.clone(), sender));
        }
        self.stats.write().total_connections += 1;
        info!(client_id = %id, "client connected");
    }

    /// Deregisters a connection. Idempotent: removing an already-removed
    /// connection is a no-op.
    pub fn remove_socket(&self, id: &str) {
        if self.clients.write().remove(id).is_some() {
            info!(client_id = %id, "client disconnected");
        }
    }

    /// Stamps an inbound message with the sender's registered id, the current
    /// timestamp, and this front-end's instance id. Does not broadcast.
    pub fn receive_message(&self, sender: &str, raw: Message) -> Message {
        raw.stamped(sender, &self.instance_id)
    }

    /// Writes the message to every registered connection except the sender.
    ///
    /// A failing connection never aborts delivery to the rest; failed
    /// connections are removed after the sweep.
    pub fn send_to_other_users(&self, message: &Message) {
        self.fan_out(message, message.from_client_id());
    }

    /// Writes the message to every registered connection, no exclusion. Used
    /// when relaying a message that originated on another front-end.
    pub fn publish_message(&self, message: &Message) {
        self.fan_out(message, None);
    }

    fn fan_out(&self, message: &Message, skip: Option<&str>) {
        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "message not encodable, dropping");
                return;
            }
        };

        let mut failed = Vec::new();
        let mut recipients = 0;
        {
            let clients = self.clients.read();
            for (id, client) in clients.iter() {
                if skip.is_some_and(|s| s == id.as_str()) {
                    continue;
                }
                if client.send(frame.clone()).is_ok() {
                    recipients += 1;
                } else {
                    failed.push(id.clone());
                }
            }
        }

        for id in &failed {
            self.remove_socket(id);
        }

        self.stats.write().total_messages_relayed += 1;
        debug!(recipients, failed = failed.len(), "message fan-out");
    }

    /// Current number of connections.
    pub fn connection_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryStats {
        let mut stats = self.stats.read().clone();
        stats.current_connections = self.connection_count();
        stats
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Current number of connections.
    pub current_connections: usize,
    /// Total connections since start.
    pub total_connections: u64,
    /// Total messages fanned out since start.
    pub total_messages_relayed: u64,
}
