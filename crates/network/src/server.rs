//! Node server: fans many transports into one dispatch loop.
//!
//! # Lifecycle
//!
//! 1. `Server::new` takes ownership of the configured transports
//! 2. `Server::start` spawns one fan-in task per transport, then runs the
//!    dispatch loop until the shutdown signal fires
//! 3. On shutdown the fan-in tasks are cancelled and joined, and `start`
//!    returns a [`ServerReport`]
//!
//! A server is not restartable: `start` consumes it.
//!
//! # Ordering
//!
//! Envelopes from one transport reach the handler in arrival order. Nothing
//! is promised about the interleaving of different transports.
//!
//! # Shutdown
//!
//! The loop leaves as soon as it sees the signal. Envelopes still queued at
//! that moment are dropped, not drained.

use crate::error::ServerError;
use crate::handler::{EnvelopeHandler, LogHandler};
use crate::transport::{Address, Envelope, Transport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Period of the housekeeping timer unless configured otherwise.
pub const DEFAULT_HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(5);

/// Slots in the aggregated stream. One slot makes it a hand-off point between
/// the fan-in tasks and the dispatch loop.
const AGGREGATE_CAPACITY: usize = 1;

/// Construction-time options for a [`Server`].
#[derive(Clone)]
pub struct ServerOpts {
    /// Transports the server owns and drains.
    pub transports: Vec<Arc<dyn Transport>>,
    /// How often housekeeping runs.
    pub housekeeping_interval: Duration,
    /// Receives envelopes and housekeeping ticks.
    pub handler: Arc<dyn EnvelopeHandler>,
}

impl ServerOpts {
    pub fn new(transports: Vec<Arc<dyn Transport>>) -> Self {
        Self {
            transports,
            housekeeping_interval: DEFAULT_HOUSEKEEPING_INTERVAL,
            handler: Arc::new(LogHandler),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    pub fn with_housekeeping_interval(mut self, interval: Duration) -> Self {
        self.housekeeping_interval = interval;
        self
    }

    pub fn with_handler(mut self, handler: impl EnvelopeHandler) -> Self {
        self.handler = Arc::new(handler);
        self
    }
}

impl Default for ServerOpts {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for ServerOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addrs: Vec<Address> = self.transports.iter().map(|t| t.addr()).collect();
        f.debug_struct("ServerOpts")
            .field("transports", &addrs)
            .field("housekeeping_interval", &self.housekeeping_interval)
            .finish()
    }
}

/// Handle to a server's shutdown signal.
///
/// Cheap to clone; triggering any clone stops the server. Triggering before
/// `start` makes `start` return right after spawning its fan-in tasks.
#[derive(Clone, Debug, Default)]
pub struct Shutdown(CancellationToken);

impl Shutdown {
    pub fn trigger(&self) {
        self.0.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once the signal has been triggered.
    pub async fn triggered(&self) {
        self.0.cancelled().await
    }
}

/// What a finished server run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerReport {
    pub envelopes_processed: u64,
    pub housekeeping_ticks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    Running,
    Stopped,
}

/// The node's main loop over a fixed set of transports.
pub struct Server {
    opts: ServerOpts,
    rpc_tx: mpsc::Sender<Envelope>,
    rpc_rx: mpsc::Receiver<Envelope>,
    shutdown: Shutdown,
}

impl Server {
    pub fn new(opts: ServerOpts) -> Self {
        let (rpc_tx, rpc_rx) = mpsc::channel(AGGREGATE_CAPACITY);
        Self {
            opts,
            rpc_tx,
            rpc_rx,
            shutdown: Shutdown::default(),
        }
    }

    /// The signal that stops [`start`](Self::start). Grab it before starting.
    pub fn shutdown_signal(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn transports(&self) -> &[Arc<dyn Transport>] {
        &self.opts.transports
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// Fails if the housekeeping interval is zero or an owned transport cannot
    /// hand out its inbound queue. In both cases no task has been spawned.
    pub async fn start(self) -> Result<ServerReport, ServerError> {
        let Server {
            opts,
            rpc_tx,
            mut rpc_rx,
            shutdown,
        } = self;

        if opts.housekeeping_interval.is_zero() {
            return Err(ServerError::InvalidConfig(
                "housekeeping interval must be non-zero".into(),
            ));
        }

        let mut inbounds = Vec::with_capacity(opts.transports.len());
        for transport in &opts.transports {
            inbounds.push((transport.addr(), transport.consume()?));
        }

        let mut fan_in = JoinSet::new();
        for (addr, inbound) in inbounds {
            fan_in.spawn(forward(addr, inbound, rpc_tx.clone(), shutdown.0.clone()));
        }
        // Fan-in tasks hold the only senders from here on.
        drop(rpc_tx);

        info!(
            transports = opts.transports.len(),
            housekeeping_ms = opts.housekeeping_interval.as_millis() as u64,
            "Server started"
        );

        let period = opts.housekeeping_interval;
        let mut housekeeping = time::interval_at(Instant::now() + period, period);
        housekeeping.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handler = opts.handler;
        let mut report = ServerReport::default();
        let mut state = LoopState::Running;

        while state == LoopState::Running {
            state = tokio::select! {
                // Shutdown wins over pending envelopes.
                biased;

                _ = shutdown.triggered() => LoopState::Stopped,

                Some(envelope) = rpc_rx.recv() => {
                    handler.on_envelope(&envelope);
                    report.envelopes_processed += 1;
                    LoopState::Running
                }

                _ = housekeeping.tick() => {
                    handler.on_housekeeping();
                    report.housekeeping_ticks += 1;
                    LoopState::Running
                }
            };
        }

        debug!(tasks = fan_in.len(), "Stopping fan-in tasks");
        while let Some(joined) = fan_in.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Fan-in task failed");
            }
        }

        info!(
            envelopes = report.envelopes_processed,
            ticks = report.housekeeping_ticks,
            "Server stopped"
        );
        Ok(report)
    }
}

/// Drain one transport's inbound queue onto the aggregated stream until
/// cancelled or either side closes.
async fn forward(
    addr: Address,
    mut inbound: mpsc::Receiver<Envelope>,
    sink: mpsc::Sender<Envelope>,
    cancel: CancellationToken,
) {
    loop {
        let envelope = tokio::select! {
            _ = cancel.cancelled() => break,
            next = inbound.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = sink.send(envelope) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    trace!(addr = %addr, "Fan-in task finished");
}
