//! Avalon A3255 driver.
//!
//! The A3255 is a SHA-256 ASIC with an unusually thin serial interface:
//! single-byte control commands, configuration loaded four bits per byte,
//! and results clocked out of a shift register one bit per byte. There is
//! no acknowledgement for anything the host sends — correctness rests
//! entirely on command ordering, which [`controller::Controller`] tracks
//! explicitly.

pub mod clock;
pub mod controller;
pub mod error;
pub mod nonce;
pub mod protocol;

pub use clock::{ClockParams, ClockWord};
pub use controller::{Controller, DeviceState};
pub use nonce::{poll_for_nonces, PollOutcome};
