//! Crate-level error type.

use thiserror::Error;

use crate::chip::a3255::{clock::ClockError, error::ProtocolError};
use crate::job_source::SourceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The serial device could not be opened. Fatal: there is no
    /// reconnection logic, by the time the link is gone the chip state is
    /// unknown anyway.
    #[error("cannot open serial link: {0}")]
    LinkUnavailable(tokio_serial::Error),

    /// The link reported end-of-stream. Distinct from a read timeout,
    /// which is an expected "no data yet" and never surfaces as an error.
    #[error("serial link closed")]
    LinkClosed,

    #[error("serial link: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("link i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("work source: {0}")]
    Source(#[from] SourceError),
}
