//! TCP front-end: newline-delimited JSON frames over a raw socket.
//!
//! Each line is one wire frame. On connect a client is assigned an id,
//! receives the assignment notice, and shortly afterwards the recent history;
//! content messages are relayed to the other local connections and published
//! on the bus for the WebSocket front-end.

use crate::relay;
use futures_util::{SinkExt, StreamExt};
use parley_bus::EventBus;
use parley_registry::Registry;
use parley_types::{Message, MAX_FRAME_BYTES};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info};

/// The TCP transport front-end. One instance owns one connection registry.
#[derive(Debug)]
pub struct TcpFrontEnd {
    listener: TcpListener,
    registry: Arc<Registry>,
    bus: EventBus,
    replay_delay: Duration,
}

impl TcpFrontEnd {
    /// Binds the listener and creates the front-end's registry.
    pub async fn bind(
        addr: SocketAddr,
        bus: EventBus,
        replay_delay: Duration,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let registry = Arc::new(Registry::new(uuid::Uuid::new_v4().to_string()));
        Ok(Self {
            listener,
            registry,
            bus,
            replay_delay,
        })
    }

    /// The bound listen address.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// This front-end's registry, for statistics.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Accepts connections until the listener fails.
    pub async fn serve(self) -> std::io::Result<()> {
        info!(
            addr = %self.listener.local_addr()?,
            instance_id = %self.registry.instance_id(),
            "TCP front-end listening"
        );

        relay::spawn_bus_bridge(self.registry.clone(), self.bus.clone());

        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "TCP connection accepted");
            tokio::spawn(handle_connection(
                stream,
                self.registry.clone(),
                self.bus.clone(),
                self.replay_delay,
            ));
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    registry: Arc<Registry>,
    bus: EventBus,
    replay_delay: Duration,
) {
    let (read_half, write_half) = stream.into_split();
    let mut frames_in = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(MAX_FRAME_BYTES),
    );
    let mut frames_out = FramedWrite::new(write_half, LinesCodec::new());

    let id = Registry::generate_client_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // The assignment notice goes through the same handle as everything else,
    // so the client learns its id before any other frame.
    if let Ok(frame) = Message::assignment(id.clone()).encode() {
        let _ = tx.send(frame);
    }
    registry.add_socket(id.clone(), tx.clone());
    info!(client_id = %id, "TCP client connected");

    let writer_id = id.clone();
    let write_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if frames_out.send(frame).await.is_err() {
                break;
            }
        }
        debug!(client_id = %writer_id, "write task ended");
    });

    relay::schedule_replay(tx.clone(), bus.clone(), replay_delay);

    while let Some(frame) = frames_in.next().await {
        match frame {
            Ok(text) => relay::handle_inbound_frame(&registry, &bus, &id, &text, &tx),
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                // The codec discards up to the next newline; the connection
                // survives with an error reply, like any other bad frame.
                debug!(client_id = %id, "oversized line");
                if let Ok(frame) = Message::error("frame too large").encode() {
                    let _ = tx.send(frame);
                }
            }
            Err(LinesCodecError::Io(e)) => {
                debug!(client_id = %id, error = %e, "read failed");
                break;
            }
        }
    }

    registry.remove_socket(&id);
    write_task.abort();
    info!(client_id = %id, "TCP client disconnected");
}
