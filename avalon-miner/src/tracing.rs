//! Provide tracing, tailored to this program.
//!
//! The binary calls [`init`] once at startup to install a stdout
//! subscriber. Everything else includes `use crate::tracing::prelude::*`
//! for convenient access to the `trace!()`, `debug!()`, `info!()`,
//! `warn!()` and `error!()` macros.

use time::OffsetDateTime;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Initialize logging to stdout, filtering according to the RUST_LOG
/// environment variable and defaulting to INFO.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTimer)
                .with_target(true),
        )
        .init();
}

// Timer that formats timestamps in local time to the nearest second. The
// default timer is UTC with sub-second precision, which is just noise for
// a program whose interesting events are hundreds of milliseconds apart.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = OffsetDateTime::now_local().unwrap_or(OffsetDateTime::now_utc());
        write!(
            w,
            "{}",
            now.format(time::macros::format_description!(
                "[hour]:[minute]:[second]"
            ))
            .unwrap(),
        )
    }
}
