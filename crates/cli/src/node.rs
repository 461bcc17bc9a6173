//! Node wiring for the command-line binary.

use crate::config::CliConfig;
use bytes::Bytes;
use network::{LocalTransport, Server, ServerOpts, ServerReport, Shutdown, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Build LOCAL and REMOTE, connect them both ways, start the remote pump and
/// run a server over LOCAL until Ctrl-C.
pub async fn run_node(config: &CliConfig) -> anyhow::Result<()> {
    let tr_local = LocalTransport::new(config.local.as_str());
    let tr_remote = LocalTransport::new(config.remote.as_str());

    tr_local.connect(tr_remote.clone())?;
    tr_remote.connect(tr_local.clone())?;

    let server = Server::new(
        ServerOpts::default()
            .with_transport(tr_local.clone())
            .with_housekeeping_interval(config.housekeeping_interval()),
    );
    let shutdown = server.shutdown_signal();

    let pump = tokio::spawn(pump_messages(
        tr_remote,
        tr_local,
        Bytes::from(config.message.clone()),
        config.send_interval(),
        shutdown.clone(),
    ));

    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(err) => warn!(error = %err, "Cannot listen for Ctrl-C, shutting down"),
        }
        on_ctrl_c.trigger();
    });

    let ServerReport {
        envelopes_processed,
        housekeeping_ticks,
    } = server.start().await?;
    pump.await?;

    info!(envelopes_processed, housekeeping_ticks, "Node stopped");
    Ok(())
}

/// Send `payload` from `from` to `to` every `interval` until shutdown.
async fn pump_messages(
    from: Arc<LocalTransport>,
    to: Arc<LocalTransport>,
    payload: Bytes,
    interval: Duration,
    shutdown: Shutdown,
) {
    let to = to.addr();
    loop {
        if let Err(err) = from.send_message(&to, payload.clone()).await {
            // The server drops its receivers on shutdown.
            if shutdown.is_triggered() {
                debug!(error = %err, "Send failed during shutdown, stopping pump");
            } else {
                warn!(error = %err, "Send failed, stopping pump");
            }
            break;
        }

        tokio::select! {
            _ = shutdown.triggered() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
