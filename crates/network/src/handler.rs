//! Hooks the dispatch loop calls for each event it services.

use crate::transport::Envelope;
use tracing::{debug, info};

/// Receives what the server's dispatch loop pulls off its aggregated stream.
///
/// Block and transaction processing attach here. Calls are made from the
/// dispatch loop itself, one at a time, so implementations should return
/// quickly and hand heavy work to their own tasks.
pub trait EnvelopeHandler: Send + Sync + 'static {
    /// Called once per envelope, in aggregated-stream order.
    fn on_envelope(&self, envelope: &Envelope);

    /// Called on every housekeeping tick.
    fn on_housekeeping(&self) {}
}

/// Default handler: writes every envelope to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogHandler;

impl EnvelopeHandler for LogHandler {
    fn on_envelope(&self, envelope: &Envelope) {
        info!(
            from = %envelope.from,
            len = envelope.payload.len(),
            payload = %String::from_utf8_lossy(&envelope.payload),
            "Received message"
        );
    }

    fn on_housekeeping(&self) {
        debug!("Housekeeping tick");
    }
}
