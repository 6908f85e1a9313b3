//! # Parley Node
//!
//! The runnable Parley relay node.
//!
//! A node bridges two client transports onto one shared chat channel:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Parley Node                         │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │  ┌──────────────┐                     ┌────────────────┐  │
//! │  │ TCP front-end│                     │ WS front-end   │  │
//! │  │  (lines)     │                     │  (axum /ws)    │  │
//! │  │  registry A  │                     │  registry B    │  │
//! │  └──────┬───────┘                     └───────┬────────┘  │
//! │         │        publish / subscribe         │           │
//! │         └──────────────┬─────────────────────┘           │
//! │                        │                                 │
//! │                  ┌─────┴─────┐                           │
//! │                  │ Event bus │                           │
//! │                  └─────┬─────┘                           │
//! │                        │                                 │
//! │                ┌───────┴────────┐                        │
//! │                │ History store  │                        │
//! │                │ (bounded FIFO) │                        │
//! │                └────────────────┘                        │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Each front-end broadcasts inbound content to its own connections and
//! publishes it on the bus; the other front-end relays it to its connections,
//! skipping messages it produced itself. The history store answers the
//! delayed replay every new connection receives after its id assignment.
//!
//! ## Modules
//!
//! - [`config`] - Node configuration management
//! - [`tcp_api`] - Newline-delimited TCP front-end
//! - [`ws_api`] - WebSocket front-end and stats endpoint
//! - [`relay`] - Plumbing shared by the front-ends

pub mod config;
pub mod relay;
pub mod tcp_api;
pub mod ws_api;
