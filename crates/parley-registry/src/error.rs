//! Error types for the connection registry.

use thiserror::Error;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The connection's write channel is closed.
    #[error("connection channel closed")]
    ChannelClosed,
}
