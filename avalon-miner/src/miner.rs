//! The work cycle.
//!
//! One cycle: drop stale device bytes, fetch work, drive the chip
//! through idle → reset → configure → idle, then poll for nonces until
//! the deadline passes or the chip's counter wraps. Cycles repeat until
//! shutdown is requested; the token is checked at every cycle boundary
//! and between byte reads while polling.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::chip::a3255::{poll_for_nonces, ClockParams, Controller, PollOutcome};
use crate::error::Result;
use crate::hash_data;
use crate::job_source::JobSource;
use crate::tracing::prelude::*;
use crate::transport::ByteLink;

#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// PLL dividers for the hash clock.
    pub clock: ClockParams,

    /// How long one work item is polled before fetching fresh work.
    pub cycle_deadline: Duration,

    /// Wait limit for each single-byte device read.
    pub read_timeout: Duration,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            clock: ClockParams::default(),
            cycle_deadline: Duration::from_secs(17),
            read_timeout: Duration::from_millis(500),
        }
    }
}

/// Ties the chip controller to a work source and runs the cycle loop.
pub struct Miner<L, S> {
    controller: Controller<L>,
    source: S,
    config: MinerConfig,
}

impl<L: ByteLink, S: JobSource> Miner<L, S> {
    pub fn new(link: L, source: S, config: MinerConfig) -> Self {
        Self {
            controller: Controller::new(link),
            source,
            config,
        }
    }

    /// Run work cycles until `shutdown` is cancelled.
    ///
    /// Clock parameters are validated before the first cycle; a work
    /// fetch failure ends the run, since without work there is nothing
    /// to drive and no retry policy exists.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let clock_word = self.config.clock.clock_word()?;
        info!(
            frequency_mhz = self.config.clock.frequency_mhz(),
            "hash clock configured"
        );

        // Keep the chip quiet until the first work item arrives.
        self.controller.park().await?;

        while !shutdown.is_cancelled() {
            self.controller.clear_input().await?;
            let work = self.source.fetch_work().await?;

            self.controller.set_idle().await?;
            self.controller.reset().await?;
            let job_words = hash_data::hash_config_words(&work.header);
            self.controller
                .load_configuration(clock_word, &job_words)
                .await?;
            self.controller.set_idle().await?;

            let deadline = Instant::now() + self.config.cycle_deadline;
            let link = self.controller.hashing_link()?;
            let outcome = poll_for_nonces(
                link,
                &mut self.source,
                &work,
                deadline,
                self.config.read_timeout,
                &shutdown,
            )
            .await?;

            match outcome {
                PollOutcome::Cancelled => break,
                PollOutcome::DeadlineExpired => debug!("cycle deadline reached"),
                PollOutcome::WraparoundDetected => debug!("search space exhausted"),
            }
        }

        info!("miner stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_source::testing::RecordingSource;
    use crate::transport::mock::ScriptedLink;

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_before_the_first_fetch() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let source = RecordingSource::new(false);
        let miner = Miner::new(ScriptedLink::new(), source, MinerConfig::default());
        miner.run(shutdown).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn full_cycle_submits_once_then_fetches_fresh_work() {
        let shutdown = CancellationToken::new();

        let mut link = ScriptedLink::new();
        // One solved word, then the same word again: the first cycle ends
        // by wraparound after a single submission.
        link.push_response_word(0x32b0_c461);
        link.push_response_word(0x32b0_c461);

        let mut source = RecordingSource::new(true);
        source.cancel_after = Some((1, shutdown.clone()));
        let validations = source.validations.clone();
        let submissions = source.submissions.clone();

        let miner = Miner::new(link, source, MinerConfig::default());
        miner.run(shutdown).await.unwrap();

        assert_eq!(validations.lock().unwrap().clone(), vec![0xe1c2_b032]);
        assert_eq!(submissions.lock().unwrap().clone(), vec![0xe1c2_b032]);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_clock_configuration_never_reaches_the_wire() {
        let shutdown = CancellationToken::new();
        let mut config = MinerConfig::default();
        config.clock.input_div = 5;

        let source = RecordingSource::new(false);
        let miner = Miner::new(ScriptedLink::new(), source, config);

        assert!(miner.run(shutdown).await.is_err());
    }
}
