use std::path::PathBuf;

use thiserror::Error;

use crate::event::NotificationKind;

/// Errors reported by platform services
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Not enough heap to allocate the device context
    #[error("Out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    /// Persisted application config could not be read or decoded
    #[error("Failed to load config from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// Platform runtime refused to start
    #[error("Runtime initialization failed: {0}")]
    RuntimeInit(String),

    /// Hardware driver reported an error
    #[error("Driver initialization failed: {0}")]
    DriverInit(String),

    /// Worker could not be launched
    #[error("Failed to start worker: {0}")]
    WorkerStart(String),

    /// Firmware info could not be read from the audio subsystem
    #[error("Firmware query failed: {0}")]
    FirmwareQuery(String),

    /// Handler registration was refused
    #[error("Subscription to {kind:?} rejected: {reason}")]
    SubscriptionRejected {
        kind: NotificationKind,
        reason: String,
    },

    /// Firmware name does not fit its fixed-size field
    #[error("Firmware name is {len} bytes, limit is {max}")]
    NameTooLong { len: usize, max: usize },

    /// Notification dispatch thread is gone
    #[error("Notification dispatcher has stopped")]
    DispatcherStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
