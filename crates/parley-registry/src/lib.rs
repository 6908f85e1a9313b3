//! # Parley Registry
//!
//! Per-transport connection registry for the Parley chat relay.
//!
//! Each transport front-end owns one [`Registry`] tracking its live
//! connections. The registry assigns client ids, stamps inbound messages with
//! server-side metadata, and performs local fan-out: [`Registry::send_to_other_users`]
//! excludes the sender, [`Registry::publish_message`] writes to everyone and
//! is used for messages bridged in from the other transport.
//!
//! Connections are addressed through send-only frame handles; the registry
//! never touches a socket. A handle whose writer task has gone away fails its
//! send, and the connection is removed without disturbing delivery to the
//! rest.
//!
//! ## Example
//!
//! ```rust
//! use parley_registry::Registry;
//! use parley_types::Message;
//!
//! let registry = Registry::new("instance-1".to_string());
//!
//! let id = Registry::generate_client_id();
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! registry.add_socket(id.clone(), tx);
//!
//! let raw = Message::decode(r#"{"message":"hello"}"#).unwrap();
//! let msg = registry.receive_message(&id, raw);
//! registry.send_to_other_users(&msg);
//! ```

mod client;
mod error;
mod registry;

pub use client::{create_client, Client, ClientReceiver};
pub use error::RegistryError;
pub use registry::{Registry, RegistryStats};
