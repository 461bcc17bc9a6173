//! Command-line node for the toy chain.
//!
//! Wires two simulated transports together and runs a server over one of
//! them:
//! - `config`: flags and logging setup
//! - `node`: transport wiring, the message pump and the server run

pub mod config;
pub mod node;

pub use config::CliConfig;
pub use node::run_node;
