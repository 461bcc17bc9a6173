//! Block container.
//!
//! Transactions are opaque byte blobs for now. A block encodes as its header,
//! a `u32` transaction count, then each transaction as a `u32` length prefix
//! followed by its bytes (all little-endian).

use crate::error::{Error, Result};
use crate::header::{read_array, Header};
use std::io::{Read, Write};

/// Opaque transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Transaction {
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn encode_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        let len = u32::try_from(self.data.len())
            .map_err(|_| Error::TransactionTooLarge(self.data.len()))?;
        w.write_all(&len.to_le_bytes())?;
        w.write_all(&self.data)?;
        Ok(())
    }

    pub fn decode_binary<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let len = u32::from_le_bytes(read_array(r)?) as usize;
        let mut data = Vec::new();
        // take() bounds the allocation by what the reader actually holds
        r.take(len as u64).read_to_end(&mut data)?;
        if data.len() != len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        self.data = data;
        Ok(())
    }
}

/// A header plus the transactions it commits to.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn encode_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        self.header.encode_binary(w)?;
        let count = u32::try_from(self.transactions.len())
            .map_err(|_| Error::TooManyTransactions(self.transactions.len()))?;
        w.write_all(&count.to_le_bytes())?;
        for tx in &self.transactions {
            tx.encode_binary(w)?;
        }
        Ok(())
    }

    pub fn decode_binary<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let mut header = Header::default();
        header.decode_binary(r)?;

        let count = u32::from_le_bytes(read_array(r)?);
        let mut transactions = Vec::new();
        for _ in 0..count {
            let mut tx = Transaction::default();
            tx.decode_binary(r)?;
            transactions.push(tx);
        }

        self.header = header;
        self.transactions = transactions;
        Ok(())
    }

    /// Encode into a freshly allocated buffer, ready to hand to a transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_binary(&mut buf)?;
        Ok(buf)
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }
}
