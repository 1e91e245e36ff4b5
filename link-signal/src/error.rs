//! Error types for link-signal

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`ConnectivitySignal`](crate::ConnectivitySignal) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The requested initial count does not fit in a single slot
    #[error("Initial count {requested} exceeds signal capacity of {capacity}")]
    CapacityExceeded { requested: u32, capacity: u32 },

    /// A bounded wait expired before the signal arrived
    #[error("Timed out after {0:?} waiting for signal")]
    TimedOut(Duration),

    /// The signal was destroyed before or during the wait
    #[error("Signal has been destroyed")]
    Destroyed,
}

/// Result type for link-signal operations
pub type Result<T> = std::result::Result<T, SignalError>;
