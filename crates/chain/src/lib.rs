//! Block and header types for the toy chain.
//!
//! This crate provides:
//! - The fixed-layout block header and its binary codec
//! - A minimal block/transaction container
//!
//! The network layer never looks inside these; it carries their encoded bytes
//! as opaque payloads.

pub mod block;
pub mod error;
pub mod header;

pub use block::{Block, Transaction};
pub use error::{Error, Result};
pub use header::{Header, HEADER_LEN};
