//! Command sequencing for the A3255.
//!
//! The chip never acknowledges a command and cannot be queried for its
//! state. The [`Controller`] therefore owns the link outright and tracks
//! the device state itself; any call that would break the required
//! ordering fails before a byte touches the wire.

use std::time::Duration;

use bytes::BytesMut;

use super::error::ProtocolError;
use super::{protocol, ClockWord};
use crate::error::Result;
use crate::tracing::prelude::*;
use crate::transport::ByteLink;

/// Hold time on each edge of the reset line.
const RESET_HOLD: Duration = Duration::from_millis(300);

/// Nonce search always starts at the bottom of the counter range.
const START_NONCE: u32 = 0;

/// Device state as implied by the commands sent so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Idle,
    Resetting,
    Configuring,
    Hashing,
}

/// Commands that move the device state.
#[derive(Debug, Clone, Copy)]
enum Op {
    SetIdle,
    Reset,
    LoadConfiguration,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::SetIdle => "set_idle",
            Op::Reset => "reset",
            Op::LoadConfiguration => "load_configuration",
        }
    }
}

/// Drives the reset/idle/configure sequence over an exclusively owned
/// link. All device I/O in the program goes through this type or through
/// the link it lends out for polling.
pub struct Controller<L> {
    link: L,
    state: DeviceState,
}

impl<L: ByteLink> Controller<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            state: DeviceState::Idle,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    fn advance(&mut self, op: Op) -> std::result::Result<(), ProtocolError> {
        use DeviceState::*;
        let next = match (self.state, op) {
            (Idle | Hashing, Op::SetIdle) => Idle,
            (Configuring, Op::SetIdle) => Hashing,
            (Idle, Op::Reset) => Resetting,
            (Resetting, Op::LoadConfiguration) => Configuring,
            (state, op) => {
                return Err(ProtocolError::InvalidTransition {
                    state,
                    operation: op.name(),
                })
            }
        };
        self.state = next;
        Ok(())
    }

    /// Park the chip: idle the hash unit and leave the reset line
    /// asserted. Used at startup so the chip sits quiet until the first
    /// work arrives.
    pub async fn park(&mut self) -> Result<()> {
        self.link
            .write_bytes(&[
                protocol::SET_IDLE,
                protocol::ASSERT_RESET,
                protocol::SET_IDLE,
            ])
            .await?;
        debug!("chip parked in reset");
        Ok(())
    }

    /// Idle the hash unit. No acknowledgement exists.
    pub async fn set_idle(&mut self) -> Result<()> {
        self.advance(Op::SetIdle)?;
        self.link.write_bytes(&[protocol::SET_IDLE]).await
    }

    /// Pulse the reset line: assert, hold, release, hold. Blocking for
    /// the full 600 ms; there is no safe point to cancel mid-sequence.
    pub async fn reset(&mut self) -> Result<()> {
        self.advance(Op::Reset)?;
        self.link.write_bytes(&[protocol::ASSERT_RESET]).await?;
        tokio::time::sleep(RESET_HOLD).await;
        self.link.write_bytes(&[protocol::RELEASE_RESET]).await?;
        tokio::time::sleep(RESET_HOLD).await;
        Ok(())
    }

    /// Load the clock word and job data: clock word plus a zero word,
    /// the hash configuration words, then the start nonce. One
    /// fire-and-forget burst; a loss only shows up as a silent cycle.
    pub async fn load_configuration(&mut self, clock: ClockWord, hash_words: &[u32]) -> Result<()> {
        self.advance(Op::LoadConfiguration)?;

        let mut frame = BytesMut::with_capacity((hash_words.len() + 3) * protocol::NIBBLES_PER_WORD);
        protocol::encode_words(&[clock.bits(), 0], &mut frame);
        protocol::encode_words(hash_words, &mut frame);
        protocol::encode_words(&[START_NONCE], &mut frame);

        trace!(bytes = frame.len(), "loading configuration");
        self.link.write_bytes(&frame).await
    }

    /// Drop whatever the device sent since the last cycle.
    pub async fn clear_input(&mut self) -> Result<()> {
        self.link.clear_input().await
    }

    /// Lend out the link for nonce polling. Only legal while hashing;
    /// anything else means the caller skipped part of the sequence.
    pub fn hashing_link(&mut self) -> std::result::Result<&mut L, ProtocolError> {
        match self.state {
            DeviceState::Hashing => Ok(&mut self.link),
            state => Err(ProtocolError::NotHashing { state }),
        }
    }
}
