//! Serial port implementation of [`ByteLink`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};

use super::ByteLink;
use crate::error::{Error, Result};

/// The one serial connection to the chip, opened at process start and
/// held for the process lifetime.
pub struct SerialLink {
    port: SerialStream,
}

impl SerialLink {
    /// Open the serial device. 8N1 framing, no flow control.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = tokio_serial::new(path, baud)
            .open_native_async()
            .map_err(Error::LinkUnavailable)?;
        Ok(Self { port })
    }
}

#[async_trait]
impl ByteLink for SerialLink {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes).await?;
        self.port.flush().await?;
        Ok(())
    }

    async fn read_byte(&mut self, limit: Duration) -> Result<Option<u8>> {
        match timeout(limit, self.port.read_u8()).await {
            // No byte within the limit: not an error, the chip has
            // nothing to say.
            Err(_elapsed) => Ok(None),
            Ok(Ok(byte)) => Ok(Some(byte)),
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::LinkClosed),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn clear_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
