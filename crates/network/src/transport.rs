//! Transport abstraction shared by every endpoint kind.
//!
//! A transport owns an inbound queue of [`Envelope`]s and knows how to push
//! envelopes into the queues of the peers it has been connected to.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Identifier of one endpoint.
///
/// Cheap to clone (shared string) and usable as a map key. Within one process
/// no two live endpoints share an address.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Arc<str>);

impl Address {
    pub fn new(addr: impl AsRef<str>) -> Self {
        Address(Arc::from(addr.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Address::new(addr)
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Address(Arc::from(addr))
    }
}

/// Unit delivered between endpoints: who sent it and the raw bytes.
///
/// The payload has no structure at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub from: Address,
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(from: Address, payload: impl Into<Bytes>) -> Self {
        Self {
            from,
            payload: payload.into(),
        }
    }
}

/// How an endpoint sends, receives and peers with other endpoints.
///
/// The server only ever holds `Arc<dyn Transport>`; `connect` takes the
/// concrete peer type and is therefore not part of the vtable.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Hand out the read side of the inbound queue.
    ///
    /// Envelopes come out in arrival order and the stream stays open while the
    /// transport is alive. There is a single consumer: the first call gets the
    /// receiver, later calls fail with
    /// [`TransportError::AlreadyConsumed`](crate::TransportError::AlreadyConsumed).
    fn consume(&self) -> Result<mpsc::Receiver<Envelope>>;

    /// Make `peer` reachable from this endpoint. One direction only.
    fn connect(&self, peer: Arc<Self>) -> Result<()>
    where
        Self: Sized;

    /// Deliver `payload` to the peer registered under `to`.
    ///
    /// Waits for room if the destination's queue is full.
    async fn send_message(&self, to: &Address, payload: Bytes) -> Result<()>;

    /// This endpoint's own address, stable for its lifetime.
    fn addr(&self) -> Address;
}
