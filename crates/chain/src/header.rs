//! Block header and its binary layout.
//!
//! The header is written field by field, little-endian, with no padding:
//!
//! ```text
//! version    u32       4 bytes
//! prev_block [u8; 32] 32 bytes
//! timestamp  i64       8 bytes (unix nanoseconds)
//! height     u32       4 bytes
//! nonce      u64       8 bytes
//! ```

use crate::error::Result;
use std::io::{Read, Write};
use types::{Hash, HASH_LEN};

/// Encoded size of a [`Header`] in bytes.
pub const HEADER_LEN: usize = 4 + HASH_LEN + 8 + 4 + 8;

/// Fixed-layout block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Header {
    pub version: u32,
    /// Hash of the previous block.
    pub prev_block: Hash,
    /// Creation time in unix nanoseconds.
    pub timestamp: i64,
    pub height: u32,
    pub nonce: u64,
}

impl Header {
    /// Write the header to `w` in wire order.
    pub fn encode_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(self.prev_block.as_bytes())?;
        w.write_all(&self.timestamp.to_le_bytes())?;
        w.write_all(&self.height.to_le_bytes())?;
        w.write_all(&self.nonce.to_le_bytes())?;
        Ok(())
    }

    /// Read a header from `r`, overwriting every field of `self`.
    ///
    /// On error `self` is left untouched.
    pub fn decode_binary<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let version = u32::from_le_bytes(read_array(r)?);
        let prev_block = Hash(read_array(r)?);
        let timestamp = i64::from_le_bytes(read_array(r)?);
        let height = u32::from_le_bytes(read_array(r)?);
        let nonce = u64::from_le_bytes(read_array(r)?);

        *self = Header {
            version,
            prev_block,
            timestamp,
            height,
            nonce,
        };
        Ok(())
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        self.encode_binary(&mut buf)?;
        Ok(buf)
    }
}

pub(crate) fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}
