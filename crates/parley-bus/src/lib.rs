//! # Parley Bus
//!
//! In-process publish/subscribe bus decoupling the transport front-ends from
//! the history store and from each other.
//!
//! Two topics exist:
//!
//! - **publish-message**: fire-and-forget broadcast of a [`Message`] to every
//!   subscriber (the history store and all front-ends). Messages are carried
//!   by value; the origin instance id rides along so front-ends can suppress
//!   their own echoes.
//! - **read-stored-messages**: request/response. A caller asks for the
//!   current history snapshot and awaits the reply with a timeout; a timeout
//!   or a gone store is reported as an error and treated by callers as "no
//!   history available".

use parley_types::Message;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{timeout, Duration};

/// Capacity of the publish-message broadcast channel.
const BROADCAST_CAPACITY: usize = 1024;

/// Capacity of the history query channel.
const QUERY_CAPACITY: usize = 64;

/// How long a history read waits before giving up.
const HISTORY_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur on the bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The history store is not running.
    #[error("history store unavailable")]
    StoreUnavailable,

    /// The history store did not answer in time.
    #[error("history read timed out")]
    ReadTimeout,
}

/// A request for the current history snapshot.
#[derive(Debug)]
pub struct HistoryQuery {
    /// Where the snapshot is delivered. Dropping the receiver is harmless.
    pub reply: oneshot::Sender<Vec<Message>>,
}

/// Receiving end of the read-stored-messages topic, owned by the history
/// store actor.
pub type HistoryQueries = mpsc::Receiver<HistoryQuery>;

/// Handle to the event bus. Cheap to clone; all clones share the same topics.
#[derive(Debug, Clone)]
pub struct EventBus {
    publish_tx: broadcast::Sender<Message>,
    query_tx: mpsc::Sender<HistoryQuery>,
}

impl EventBus {
    /// Creates the bus, returning the shared handle and the query stream the
    /// history store consumes.
    pub fn new() -> (Self, HistoryQueries) {
        let (publish_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (query_tx, query_rx) = mpsc::channel(QUERY_CAPACITY);
        (
            Self {
                publish_tx,
                query_tx,
            },
            query_rx,
        )
    }

    /// Publishes a message to every subscriber. Fire-and-forget: a bus with
    /// no subscribers drops the message silently.
    pub fn publish(&self, message: Message) {
        let _ = self.publish_tx.send(message);
    }

    /// Subscribes to the publish-message topic.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.publish_tx.subscribe()
    }

    /// Requests the current history snapshot, oldest first.
    pub async fn read_history(&self) -> Result<Vec<Message>, BusError> {
        let (reply, rx) = oneshot::channel();
        self.query_tx
            .send(HistoryQuery { reply })
            .await
            .map_err(|_| BusError::StoreUnavailable)?;

        match timeout(HISTORY_READ_TIMEOUT, rx).await {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(_)) => Err(BusError::StoreUnavailable),
            Err(_) => Err(BusError::ReadTimeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let (bus, _queries) = EventBus::new();
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        bus.publish(Message::chat("hello"));

        assert_eq!(sub1.recv().await.unwrap().content(), Some("hello"));
        assert_eq!(sub2.recv().await.unwrap().content(), Some("hello"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let (bus, _queries) = EventBus::new();
        bus.publish(Message::chat("nobody home"));
    }

    #[tokio::test]
    async fn test_read_history_answers() {
        let (bus, mut queries) = EventBus::new();

        tokio::spawn(async move {
            let query = queries.recv().await.unwrap();
            let _ = query.reply.send(vec![Message::chat("old")]);
        });

        let snapshot = bus.read_history().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content(), Some("old"));
    }

    #[tokio::test]
    async fn test_read_history_with_no_store_fails() {
        let (bus, queries) = EventBus::new();
        drop(queries);

        assert!(matches!(
            bus.read_history().await,
            Err(BusError::StoreUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_read_history_dropped_reply_fails() {
        let (bus, mut queries) = EventBus::new();

        tokio::spawn(async move {
            let query = queries.recv().await.unwrap();
            drop(query.reply);
        });

        assert!(matches!(
            bus.read_history().await,
            Err(BusError::StoreUnavailable)
        ));
    }
}
