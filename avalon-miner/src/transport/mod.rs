//! Byte transport to the chip.
//!
//! The chip has no framing: every byte on the wire is a complete
//! transmission unit. The [`ByteLink`] trait is therefore deliberately
//! narrow — buffered writes, a single-byte timed read, and an input
//! drain — and everything protocol-shaped lives above it in `chip`.

pub mod serial;

#[cfg(test)]
pub(crate) mod mock;

pub use serial::SerialLink;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Exclusive handle on the byte-oriented device link.
///
/// A read that produces no byte within its time limit returns `Ok(None)`;
/// the chip is simply not talking yet. Link faults and end-of-stream are
/// errors. Keeping those apart matters: polling treats silence as normal,
/// while a vanished device must stop the process.
#[async_trait]
pub trait ByteLink: Send {
    /// Write all bytes and flush them onto the wire.
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read a single byte, waiting at most `limit`.
    async fn read_byte(&mut self, limit: Duration) -> Result<Option<u8>>;

    /// Drop any bytes the device sent that nobody consumed.
    async fn clear_input(&mut self) -> Result<()>;
}
