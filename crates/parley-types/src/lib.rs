//! # Parley Types
//!
//! Common types for the Parley chat relay.
//!
//! This crate provides the canonical [`Message`] value type exchanged between
//! clients, front-ends, and the event bus, together with the flat JSON wire
//! codec used on both transports.
//!
//! ## Wire format
//!
//! One JSON object per frame (one line on TCP, one text frame on WebSocket):
//!
//! ```json
//! {"message": "hello", "time": 1700000000000, "fromClientId": "…", "nickname": "alice"}
//! ```
//!
//! A frame without a `message` key is a control frame (for example the id
//! assignment notice `{"clientId": "…"}`) and is never broadcast or stored.
//! Unknown keys pass through unchanged.

mod message;
mod wire;

pub use message::{ClientId, InstanceId, Message};
pub use wire::{WireError, MAX_FRAME_BYTES};

/// Wire key carrying the connection id on assignment notices.
pub const CLIENT_ID_KEY: &str = "clientId";

/// Wire key carrying the chat payload.
pub const MESSAGE_CONTENT_KEY: &str = "message";

/// Wire key carrying the server-side epoch-millis timestamp.
pub const TIME_KEY: &str = "time";

/// Wire key carrying the originating connection id.
pub const FROM_CLIENT_ID_KEY: &str = "fromClientId";
