//! In-process transport for simulated networks.
//!
//! Delivery is a direct push into the destination's inbound queue: no
//! serialization, no loss, and no reordering between one sender and one
//! receiver.
//!
//! # Concurrency
//!
//! - The peer registry sits behind a reader-writer lock. Lookups in
//!   `send_message` share the read side, `connect` takes the write side.
//! - The inbound queue is a bounded tokio mpsc channel, safe for many
//!   producers and one consumer without extra locking.
//! - A full queue makes senders wait (backpressure) instead of failing.
//!
//! # Ownership
//!
//! Registry entries are weak references. Connecting two transports in both
//! directions does not keep either alive; a peer that has been dropped stays
//! registered but fails delivery with `InboundClosed`.

use crate::error::{Result, TransportError};
use crate::transport::{Address, Envelope, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Capacity of a transport's inbound queue unless set explicitly.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1024;

/// Transport that delivers to peers living in the same process.
///
/// Each instance owns its own peer registry and inbound queue; there is no
/// global registry, so instances can be created and dropped independently.
pub struct LocalTransport {
    addr: Address,
    inbound_tx: mpsc::Sender<Envelope>,
    /// Taken by the first `consume` call.
    inbound_rx: Mutex<Option<mpsc::Receiver<Envelope>>>,
    peers: RwLock<HashMap<Address, Weak<LocalTransport>>>,
}

impl LocalTransport {
    /// Create a transport with the default inbound capacity.
    ///
    /// Returned behind an `Arc`: callers own it, peers only hold weak
    /// references.
    pub fn new(addr: impl Into<Address>) -> Arc<Self> {
        Self::with_capacity(addr, DEFAULT_INBOUND_CAPACITY)
    }

    /// Create a transport whose inbound queue holds at most `capacity`
    /// envelopes.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(addr: impl Into<Address>, capacity: usize) -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        Arc::new(Self {
            addr: addr.into(),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            peers: RwLock::new(HashMap::new()),
        })
    }

    /// Addresses of every registered peer, sorted.
    pub fn peers(&self) -> Vec<Address> {
        let mut peers: Vec<Address> = self.peers.read().keys().cloned().collect();
        peers.sort();
        peers
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    /// True if `addr` is registered and that peer is still alive.
    pub fn is_connected(&self, addr: &Address) -> bool {
        self.peers
            .read()
            .get(addr)
            .is_some_and(|peer| peer.strong_count() > 0)
    }

    /// The live transport registered under `addr`, if any.
    pub fn peer(&self, addr: &Address) -> Option<Arc<LocalTransport>> {
        self.peers.read().get(addr).and_then(Weak::upgrade)
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn consume(&self) -> Result<mpsc::Receiver<Envelope>> {
        self.inbound_rx
            .lock()
            .take()
            .ok_or_else(|| TransportError::AlreadyConsumed(self.addr.clone()))
    }

    fn connect(&self, peer: Arc<Self>) -> Result<()> {
        let peer_addr = peer.addr();
        let previous = self
            .peers
            .write()
            .insert(peer_addr.clone(), Arc::downgrade(&peer));
        debug!(
            addr = %self.addr,
            peer = %peer_addr,
            replaced = previous.is_some(),
            "Connected to peer"
        );
        Ok(())
    }

    async fn send_message(&self, to: &Address, payload: Bytes) -> Result<()> {
        // Clone the sender under the read lock; the guard must not be held
        // while waiting for queue space.
        let inbound = {
            let peers = self.peers.read();
            match peers.get(to) {
                Some(peer) => peer.upgrade().map(|peer| peer.inbound_tx.clone()),
                None => {
                    return Err(TransportError::UnknownPeer {
                        from: self.addr.clone(),
                        to: to.clone(),
                    })
                }
            }
        };
        let closed = || TransportError::InboundClosed {
            from: self.addr.clone(),
            to: to.clone(),
        };
        let inbound = inbound.ok_or_else(closed)?;

        trace!(from = %self.addr, to = %to, len = payload.len(), "Sending message");
        inbound
            .send(Envelope::new(self.addr.clone(), payload))
            .await
            .map_err(|_| closed())
    }

    fn addr(&self) -> Address {
        self.addr.clone()
    }
}

impl fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTransport")
            .field("addr", &self.addr)
            .field("peers", &self.peers())
            .field("queued", &(self.inbound_tx.max_capacity() - self.inbound_tx.capacity()))
            .finish()
    }
}
