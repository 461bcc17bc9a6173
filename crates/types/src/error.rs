//! Error types for the shared primitives.

use thiserror::Error;

/// Result type alias for the types crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building primitive values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Byte slice had the wrong length for the target type
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Hex string could not be decoded
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
