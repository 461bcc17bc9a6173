//! Transport and message dispatch for a toy peer-to-peer node.
//!
//! This crate provides:
//! - The `Transport` trait describing how bytes move between endpoints
//! - `LocalTransport`, an in-process transport for simulated networks
//! - `Server`, which fans every owned transport into one dispatch loop

pub mod error;
pub mod handler;
pub mod local;
pub mod server;
pub mod transport;

pub use error::{Result, ServerError, TransportError};
pub use handler::{EnvelopeHandler, LogHandler};
pub use local::{LocalTransport, DEFAULT_INBOUND_CAPACITY};
pub use server::{Server, ServerOpts, ServerReport, Shutdown, DEFAULT_HOUSEKEEPING_INTERVAL};
pub use transport::{Address, Envelope, Transport};
