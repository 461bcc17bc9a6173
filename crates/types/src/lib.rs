//! Shared primitive types for the toy chain.
//!
//! This crate provides the small value types every other crate leans on:
//! - Fixed-size hashes
//! - The common error type

pub mod error;
pub mod hash;

pub use error::{Error, Result};
pub use hash::{Hash, HASH_LEN};
