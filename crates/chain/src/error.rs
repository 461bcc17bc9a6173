//! Error types for the chain codec.

use thiserror::Error;

/// Result type alias for the chain crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding chain types.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying reader or writer failed, including short reads
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Transaction body does not fit the u32 length prefix
    #[error("transaction too large: {0} bytes")]
    TransactionTooLarge(usize),
    /// Block holds more transactions than the u32 count prefix allows
    #[error("too many transactions: {0}")]
    TooManyTransactions(usize),
}
