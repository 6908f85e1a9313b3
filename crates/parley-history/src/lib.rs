//! # Parley History
//!
//! Bounded in-memory record of recent chat content, and the replay source for
//! newly joined clients.
//!
//! [`HistoryStore`] keeps at most `capacity` messages in arrival order,
//! evicting the oldest first. [`HistoryStore::run`] turns the store into a
//! single-threaded actor: it appends content-bearing messages from its bus
//! subscription and answers history queries with an oldest-first snapshot, so
//! the buffer itself needs no locking. Entries are never mutated after
//! append; the buffer is cleared only by process restart.

use parley_bus::{EventBus, HistoryQueries};
use parley_types::Message;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Default history capacity when none is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded FIFO buffer of the most recent chat messages.
#[derive(Debug)]
pub struct HistoryStore {
    entries: VecDeque<Message>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates a store holding at most `capacity` messages. A zero capacity
    /// falls back to the default.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a message, evicting the oldest entry past capacity. Messages
    /// without content (control frames) are ignored.
    pub fn append(&mut self, message: Message) {
        if !message.has_content() {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// The current buffer contents in chronological (oldest-first) order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries.iter().cloned().collect()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the store as an actor until the query channel closes.
    ///
    /// Subscribes to the publish topic for appends and serves
    /// read-stored-messages queries. The subscription is taken before the
    /// returned future is polled, so nothing published after `run` is called
    /// is lost. A query whose requester has gone away is answered into the
    /// void, which is fine.
    pub fn run(
        mut self,
        bus: EventBus,
        mut queries: HistoryQueries,
    ) -> impl std::future::Future<Output = ()> {
        let mut messages = bus.subscribe();
        async move {
            loop {
                tokio::select! {
                    received = messages.recv() => match received {
                        Ok(message) => self.append(message),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "history store lagged behind the bus");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            debug!("publish topic closed");
                            break;
                        }
                    },
                    query = queries.recv() => match query {
                        Some(query) => {
                            let _ = query.reply.send(self.snapshot());
                        }
                        None => break,
                    },
                }
            }
            debug!(stored = self.len(), "history store stopped");
        }
    }
}
