//! Fixed-size hash values.
//!
//! A `Hash` is a plain 32-byte array. Nothing here computes digests; callers
//! hand in bytes they already have, or ask for random ones in tests and
//! fixtures.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of a [`Hash`].
pub const HASH_LEN: usize = 32;

/// 32-byte hash value.
///
/// Copy-able and cheap to compare, so it can sit directly inside headers and
/// be used as a map key.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// The all-zero hash.
    pub const fn zero() -> Self {
        Hash([0u8; HASH_LEN])
    }

    /// A hash filled with random bytes.
    pub fn random() -> Self {
        Hash(rand::random())
    }

    /// Build a hash from a slice that must be exactly [`HASH_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; HASH_LEN] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Hash(array))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }
}
