//! Error types for A3255 command sequencing.

use thiserror::Error;

use super::controller::DeviceState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The chip gives no feedback, so a command issued out of order would
    /// silently corrupt its state. Caught here instead.
    #[error("illegal {operation} while device is {state:?}")]
    InvalidTransition {
        state: DeviceState,
        operation: &'static str,
    },

    #[error("nonce polling requires the hashing state, device is {state:?}")]
    NotHashing { state: DeviceState },
}
