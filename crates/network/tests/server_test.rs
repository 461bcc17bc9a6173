//! End-to-end tests for transports driven by a running server.
//!
//! # Test Strategy
//!
//! 1. **Delivery**: the LOCAL/REMOTE scenario, many concurrent senders
//! 2. **Fan-in**: several owned transports feeding one loop
//! 3. **Lifecycle**: housekeeping ticks, shutdown, task cleanup

use bytes::Bytes;
use network::{
    Address, Envelope, EnvelopeHandler, LocalTransport, Server, ServerOpts, Transport,
    TransportError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

/// Forwards everything the dispatch loop services to the test.
#[derive(Clone)]
struct Recorder {
    envelopes: mpsc::UnboundedSender<Envelope>,
    ticks: Arc<AtomicU64>,
}

impl Recorder {
    fn new() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (envelopes, rx) = mpsc::unbounded_channel();
        let recorder = Self {
            envelopes,
            ticks: Arc::new(AtomicU64::new(0)),
        };
        (recorder, rx)
    }
}

impl EnvelopeHandler for Recorder {
    fn on_envelope(&self, envelope: &Envelope) {
        let _ = self.envelopes.send(envelope.clone());
    }

    fn on_housekeeping(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_local_remote_scenario() {
    let tr_local = LocalTransport::new("LOCAL");
    let tr_remote = LocalTransport::new("REMOTE");
    tr_local.connect(tr_remote.clone()).unwrap();
    tr_remote.connect(tr_local.clone()).unwrap();

    let (recorder, mut seen) = Recorder::new();
    let server = Server::new(
        ServerOpts::default()
            .with_transport(tr_local.clone())
            .with_handler(recorder),
    );
    let shutdown = server.shutdown_signal();
    let running = tokio::spawn(server.start());

    tr_remote
        .send_message(&tr_local.addr(), Bytes::from_static(b"Hello, LOCAL"))
        .await
        .unwrap();

    let envelope = timeout(WAIT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(envelope.from, Address::from("REMOTE"));
    assert_eq!(envelope.payload, Bytes::from_static(b"Hello, LOCAL"));

    shutdown.trigger();
    let report = timeout(WAIT, running).await.unwrap().unwrap().unwrap();
    assert_eq!(report.envelopes_processed, 1);
}

#[tokio::test]
async fn test_concurrent_senders_delivered_exactly_once() {
    const SENDERS: usize = 64;

    let dest = LocalTransport::new("DEST");
    let mut inbound = dest.consume().unwrap();

    let mut handles = Vec::with_capacity(SENDERS);
    for i in 0..SENDERS {
        let sender = LocalTransport::new(format!("S{i}"));
        sender.connect(dest.clone()).unwrap();
        let to = dest.addr();
        handles.push(tokio::spawn(async move {
            sender
                .send_message(&to, Bytes::from(format!("msg-{i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut received = HashSet::new();
    for _ in 0..SENDERS {
        let envelope = timeout(WAIT, inbound.recv()).await.unwrap().unwrap();
        let payload = String::from_utf8(envelope.payload.to_vec()).unwrap();
        assert_eq!(payload, format!("msg-{}", &envelope.from.as_str()[1..]));
        assert!(received.insert(envelope.from), "duplicate delivery");
    }
    assert_eq!(received.len(), SENDERS);
    assert!(inbound.try_recv().is_err(), "no extra envelopes");
}

#[tokio::test]
async fn test_unknown_peer_enqueues_nothing() {
    let tra = LocalTransport::new("A");
    let trb = LocalTransport::new("B");
    let trc = LocalTransport::new("C");
    tra.connect(trb.clone()).unwrap();
    let mut inbound_b = trb.consume().unwrap();
    let mut inbound_c = trc.consume().unwrap();

    let err = tra
        .send_message(&trc.addr(), Bytes::from_static(b"nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::UnknownPeer { .. }));
    assert!(inbound_b.try_recv().is_err());
    assert!(inbound_c.try_recv().is_err());
}

// ============================================================================
// Fan-in Tests
// ============================================================================

#[tokio::test]
async fn test_fan_in_preserves_per_source_order() {
    const PER_SOURCE: u32 = 50;

    let left = LocalTransport::new("LEFT");
    let right = LocalTransport::new("RIGHT");
    let peer = LocalTransport::new("PEER");
    peer.connect(left.clone()).unwrap();
    peer.connect(right.clone()).unwrap();

    let (recorder, mut seen) = Recorder::new();
    let server = Server::new(
        ServerOpts::default()
            .with_transport(left.clone())
            .with_transport(right.clone())
            .with_handler(recorder),
    );
    let shutdown = server.shutdown_signal();
    let running = tokio::spawn(server.start());

    let sender = peer.clone();
    let (left_addr, right_addr) = (left.addr(), right.addr());
    tokio::spawn(async move {
        for seq in 0..PER_SOURCE {
            sender
                .send_message(&left_addr, tagged(b'L', seq))
                .await
                .unwrap();
            sender
                .send_message(&right_addr, tagged(b'R', seq))
                .await
                .unwrap();
        }
    });

    let mut next = [0u32; 2];
    for _ in 0..(PER_SOURCE * 2) {
        let envelope = timeout(WAIT, seen.recv()).await.unwrap().unwrap();
        assert_eq!(envelope.from, peer.addr());

        let (tag, seq) = envelope.payload.split_at(1);
        let slot = if tag == b"L" { 0 } else { 1 };
        let seq = u32::from_le_bytes(seq.try_into().unwrap());
        assert_eq!(seq, next[slot], "source {} out of order", tag[0] as char);
        next[slot] += 1;
    }
    assert_eq!(next, [PER_SOURCE, PER_SOURCE]);

    shutdown.trigger();
    let report = timeout(WAIT, running).await.unwrap().unwrap().unwrap();
    assert_eq!(report.envelopes_processed, u64::from(PER_SOURCE * 2));
}

fn tagged(tag: u8, seq: u32) -> Bytes {
    let mut payload = vec![tag];
    payload.extend_from_slice(&seq.to_le_bytes());
    Bytes::from(payload)
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_housekeeping_runs_on_interval() {
    let (recorder, _seen) = Recorder::new();
    let ticks = recorder.ticks.clone();
    let server = Server::new(
        ServerOpts::default()
            .with_transport(LocalTransport::new("LOCAL"))
            .with_handler(recorder)
            .with_housekeeping_interval(Duration::from_millis(10)),
    );
    let shutdown = server.shutdown_signal();
    let running = tokio::spawn(server.start());

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();
    let report = timeout(WAIT, running).await.unwrap().unwrap().unwrap();

    assert!(report.housekeeping_ticks >= 2);
    assert_eq!(ticks.load(Ordering::SeqCst), report.housekeeping_ticks);
}

#[tokio::test]
async fn test_shutdown_stops_fan_in_tasks() {
    let tr_local = LocalTransport::new("LOCAL");
    let tr_remote = LocalTransport::new("REMOTE");
    tr_remote.connect(tr_local.clone()).unwrap();

    let server = Server::new(ServerOpts::default().with_transport(tr_local.clone()));
    let shutdown = server.shutdown_signal();
    let running = tokio::spawn(server.start());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!running.is_finished());

    shutdown.trigger();
    timeout(WAIT, running).await.unwrap().unwrap().unwrap();
    assert!(shutdown.is_triggered());

    // The fan-in task owned LOCAL's receiver; once it is gone the queue is
    // closed to senders.
    let err = tr_remote
        .send_message(&tr_local.addr(), Bytes::from_static(b"late"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::InboundClosed { .. }));
}

#[tokio::test]
async fn test_shutdown_with_traffic_in_flight() {
    let tr_local = LocalTransport::new("LOCAL");
    let tr_remote = LocalTransport::new("REMOTE");
    tr_remote.connect(tr_local.clone()).unwrap();

    let (recorder, _seen) = Recorder::new();
    let server = Server::new(
        ServerOpts::default()
            .with_transport(tr_local.clone())
            .with_handler(recorder),
    );
    let shutdown = server.shutdown_signal();
    let running = tokio::spawn(server.start());

    let sender = tr_remote.clone();
    let to = tr_local.addr();
    let flood = tokio::spawn(async move {
        let mut sent = 0u64;
        while sender
            .send_message(&to, Bytes::from_static(b"spam"))
            .await
            .is_ok()
        {
            sent += 1;
        }
        sent
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.trigger();

    // Envelopes still queued at shutdown are dropped, never an error.
    let report = timeout(WAIT, running).await.unwrap().unwrap().unwrap();
    let sent = timeout(WAIT, flood).await.unwrap().unwrap();
    assert!(report.envelopes_processed <= sent);
}
