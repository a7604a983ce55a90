//! Driver for Avalon A3255 mining chips attached over a plain serial link.
//!
//! The chip speaks a minimal wire protocol: single control bytes for
//! reset/idle, configuration words pushed four bits at a time, and found
//! nonces clocked back one bit per byte. This crate owns that protocol
//! (`chip`), the serial transport underneath it (`transport`), and the
//! work cycle that ties it to a getwork-style pool (`miner`, `job_source`).

pub mod chip;
pub mod error;
pub mod hash_data;
pub mod job_source;
pub mod miner;
pub mod tracing;
pub mod transport;
