//! Error types for transports and the node server.

use crate::transport::Address;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors returned by [`Transport`](crate::Transport) operations.
///
/// All of these are reported to the immediate caller; none are fatal to the
/// transport itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Destination is not in the sender's peer registry
    #[error("{from}: could not send message to {to}")]
    UnknownPeer { from: Address, to: Address },
    /// Inbound queue was already handed to a consumer
    #[error("{0}: inbound queue already consumed")]
    AlreadyConsumed(Address),
    /// Destination dropped its inbound queue
    #[error("{from}: inbound queue of {to} is closed")]
    InboundClosed { from: Address, to: Address },
}

/// Errors that stop a [`Server`](crate::Server) from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An owned transport could not hand out its inbound queue
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Options cannot drive a dispatch loop
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
