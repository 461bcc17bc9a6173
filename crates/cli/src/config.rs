//! Command-line configuration.

use crate::node::run_node;
use clap::Parser;
use std::time::Duration;
use tracing::Level;

/// Run a simulated two-endpoint node.
#[derive(Parser, Debug, Clone)]
#[command(name = "node", version, about)]
pub struct CliConfig {
    /// Address of the endpoint the server owns.
    #[arg(long, default_value = "LOCAL")]
    pub local: String,

    /// Address of the endpoint that keeps sending to the local one.
    #[arg(long, default_value = "REMOTE")]
    pub remote: String,

    /// Payload the remote endpoint sends.
    #[arg(long, default_value = "Hello, LOCAL")]
    pub message: String,

    /// Seconds between two sends from the remote endpoint.
    #[arg(long, default_value_t = 2)]
    pub send_interval_secs: u64,

    /// Seconds between housekeeping ticks.
    #[arg(long, default_value_t = 5)]
    pub housekeeping_secs: u64,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs(self.send_interval_secs)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_secs)
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// Install logging and run the node until Ctrl-C.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(self.log_level())
            .with_target(false)
            .init();

        anyhow::ensure!(self.local != self.remote, "local and remote addresses must differ");
        anyhow::ensure!(self.send_interval_secs > 0, "send interval must be positive");
        anyhow::ensure!(self.housekeeping_secs > 0, "housekeeping interval must be positive");

        run_node(&self).await
    }
}
