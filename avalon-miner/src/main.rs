//! Command line entry point.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;

use avalon_miner::chip::a3255::ClockParams;
use avalon_miner::job_source::GetworkClient;
use avalon_miner::miner::{Miner, MinerConfig};
use avalon_miner::tracing::prelude::*;
use avalon_miner::transport::SerialLink;

/// Getwork miner for an Avalon A3255 chip on a serial link
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Work source username
    username: String,

    /// Work source password
    password: String,

    /// Work source host or URL
    server: String,

    /// Serial device the chip is attached to
    #[arg(long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Clock input divider R
    #[arg(long, default_value_t = 0)]
    clock_r: u8,

    /// Clock feedback divider F
    #[arg(long, default_value_t = 19)]
    clock_f: u8,

    /// Clock output divider OD
    #[arg(long, default_value_t = 1)]
    clock_od: u8,

    /// Seconds to poll one work item before fetching fresh work
    #[arg(long, default_value_t = 17)]
    cycle_deadline: u64,

    /// Per-byte serial read timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    read_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    avalon_miner::tracing::init();
    let args = Args::parse();

    let clock = ClockParams {
        input_div: args.clock_r,
        feedback_div: args.clock_f,
        output_div: args.clock_od,
    };
    clock
        .validate()
        .context("clock configuration rejected")?;

    let link = SerialLink::open(&args.port, args.baud)
        .with_context(|| format!("opening serial device {}", args.port))?;
    info!(
        port = %args.port,
        baud = args.baud,
        frequency_mhz = clock.frequency_mhz(),
        "chip link ready"
    );

    let source = GetworkClient::new(&args.server, &args.username, &args.password);

    let config = MinerConfig {
        clock,
        cycle_deadline: Duration::from_secs(args.cycle_deadline),
        read_timeout: Duration::from_millis(args.read_timeout_ms),
    };

    // Signals only cancel the token; the miner notices at the next byte
    // boundary and winds down cleanly.
    let shutdown = CancellationToken::new();
    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::select! {
                _ = sigint.recv() => info!("received SIGINT"),
                _ = sigterm.recv() => info!("received SIGTERM"),
            }
            shutdown.cancel();
        }
    });

    Miner::new(link, source, config).run(shutdown).await?;
    Ok(())
}
