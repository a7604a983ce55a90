//! Scripted in-memory link for tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use super::ByteLink;
use crate::error::Result;

/// Link fed from a canned byte queue. Reads past the end of the script
/// behave like a silent device: they burn the full per-read limit (in
/// tokio test time) and yield nothing.
pub(crate) struct ScriptedLink {
    input: VecDeque<u8>,
    pub written: Vec<u8>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            written: Vec::new(),
        }
    }

    /// Queue one response word the way the chip emits it: 32 bytes, one
    /// bit per byte in the LSB, earliest bit landing in bit 0 of the word
    /// the reader assembles. High bits are junk on real hardware, so set
    /// them here too.
    pub fn push_response_word(&mut self, word: u32) {
        for i in 0..32 {
            self.input.push_back(0xfe | ((word >> i) & 1) as u8);
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
}

#[async_trait]
impl ByteLink for ScriptedLink {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    async fn read_byte(&mut self, limit: Duration) -> Result<Option<u8>> {
        match self.input.pop_front() {
            Some(byte) => Ok(Some(byte)),
            None => {
                tokio::time::sleep(limit).await;
                Ok(None)
            }
        }
    }

    // The script models bytes the chip has yet to send, not a stale
    // receive buffer, so there is nothing to drop here.
    async fn clear_input(&mut self) -> Result<()> {
        Ok(())
    }
}
