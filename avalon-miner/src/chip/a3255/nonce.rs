//! Nonce readback loop.
//!
//! While hashing, the chip clocks its result shift register out one bit
//! per byte, LSB of each byte, and pads with zero words when it has
//! nothing to report. The loop below reassembles those bits into raw
//! words, corrects them into nonces, and stops on one of three normal
//! conditions: the cycle deadline, a wrapped nonce counter, or shutdown.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::protocol;
use crate::error::Result;
use crate::job_source::{JobSource, WorkItem};
use crate::tracing::prelude::*;
use crate::transport::ByteLink;

const WORD_BITS: usize = 32;

/// Why a polling run ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The cycle deadline elapsed with the search space unexhausted.
    DeadlineExpired,
    /// The chip reported a nonce already seen this cycle: its counter
    /// wrapped the full range, the work is exhausted.
    WraparoundDetected,
    /// Shutdown was requested.
    Cancelled,
}

/// Poll the link for nonces until `deadline`, wraparound or cancellation.
///
/// Each candidate word is assembled from 32 byte reads; a read timing out
/// abandons the attempt with whatever bits arrived, and an all-zero word
/// is the chip's idle filler. Every distinct corrected nonce is checked
/// against the work exactly once, in arrival order, and submitted when it
/// holds up. Deadline and cancellation are observed between byte reads,
/// never mid-byte.
pub async fn poll_for_nonces<L, S>(
    link: &mut L,
    source: &mut S,
    work: &WorkItem,
    deadline: Instant,
    read_timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<PollOutcome>
where
    L: ByteLink,
    S: JobSource,
{
    let mut seen: HashSet<u32> = HashSet::new();

    loop {
        let mut word: u32 = 0;
        for _ in 0..WORD_BITS {
            if shutdown.is_cancelled() {
                return Ok(PollOutcome::Cancelled);
            }
            if Instant::now() >= deadline {
                return Ok(PollOutcome::DeadlineExpired);
            }
            match link.read_byte(read_timeout).await? {
                Some(byte) => {
                    word >>= 1;
                    if byte & 0x01 != 0 {
                        word |= 0x8000_0000;
                    }
                }
                None => break,
            }
        }

        if word == 0 {
            continue;
        }

        let nonce = protocol::nonce_from_raw(word);
        if !seen.insert(nonce) {
            debug!(
                nonce = %format!("{:#010x}", nonce),
                "repeated nonce, counter wrapped"
            );
            return Ok(PollOutcome::WraparoundDetected);
        }

        debug!(
            raw = %format!("{:#010x}", word),
            nonce = %format!("{:#010x}", nonce),
            "nonce candidate"
        );

        if source.is_valid_solution(work, nonce) {
            info!(nonce = %format!("{:#010x}", nonce), "solution found");
            match source.submit_solution(work, nonce).await {
                Ok(true) => info!("share accepted"),
                Ok(false) => warn!("share rejected by work source"),
                Err(e) => warn!(error = %e, "share submission failed"),
            }
        }
    }
}
