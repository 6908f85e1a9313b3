//! Client connection handles.

use crate::error::RegistryError;
use parley_types::ClientId;
use tokio::sync::mpsc;

/// A registered client connection.
///
/// The registry never touches the transport socket directly; each connection
/// owns a writer task that drains the receiver side of this handle and writes
/// frames in order, so per-connection delivery order matches send order.
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier.
    pub id: ClientId,
    /// Channel for sending encoded frames to this client.
    sender: mpsc::UnboundedSender<String>,
}

impl Client {
    /// Creates a new client around a frame sender.
    pub fn new(id: ClientId, sender: mpsc::UnboundedSender<String>) -> Self {
        Self { id, sender }
    }

    /// Queues an encoded frame for this client. Fails only when the writer
    /// task is gone, which marks the connection for removal.
    pub fn send(&self, frame: String) -> Result<(), RegistryError> {
        self.sender
            .send(frame)
            .map_err(|_| RegistryError::ChannelClosed)
    }
}

/// Receiving side of a client handle, drained by the connection's writer task.
pub type ClientReceiver = mpsc::UnboundedReceiver<String>;

/// Creates a client handle together with its frame receiver.
pub fn create_client(id: ClientId) -> (Client, ClientReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Client::new(id, sender), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_send() {
        let (client, mut rx) = create_client("test-client".to_string());

        client.send("frame".to_string()).unwrap();

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame, "frame");
    }

    #[test]
    fn test_client_send_after_receiver_dropped() {
        let (client, rx) = create_client("test-client".to_string());
        drop(rx);

        assert!(matches!(
            client.send("frame".to_string()),
            Err(RegistryError::ChannelClosed)
        ));
    }
}
