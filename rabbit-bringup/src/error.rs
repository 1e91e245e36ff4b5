use device_platform::PlatformError;
use link_signal::SignalError;
use thiserror::Error;

use crate::state::BringupState;

/// Errors that can end (or, for version queries, blemish) a bring-up attempt
#[derive(Error, Debug)]
pub enum BringupError {
    /// Device context or connectivity signal could not be created
    #[error("Failed to allocate {resource}: {source}")]
    AllocationFailure {
        resource: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network status handler could not be registered
    #[error("Failed to subscribe to network status: {0}")]
    SubscriptionFailure(#[source] PlatformError),

    /// Platform runtime refused to start
    #[error("Platform runtime initialization failed: {0}")]
    RuntimeInitFailure(#[source] PlatformError),

    /// Board driver failed
    #[error("Hardware driver initialization failed: {0}")]
    DriverInitFailure(#[source] PlatformError),

    /// The link wait ended without a link-up
    #[error("Waiting for network link failed: {0}")]
    LinkWaitFailure(#[source] SignalError),

    /// Audio worker could not be launched
    #[error("Failed to start worker: {0}")]
    WorkerStartFailure(#[source] PlatformError),

    /// Firmware metadata could not be read (non-fatal)
    #[error("Firmware version query failed: {0}")]
    VersionQueryFailure(#[source] PlatformError),
}

impl BringupError {
    /// Whether this error aborts bring-up
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BringupError::VersionQueryFailure(_))
    }

    /// State the sequence was in when this error occurred
    pub fn state(&self) -> BringupState {
        match self {
            BringupError::AllocationFailure { .. } => BringupState::Allocating,
            BringupError::SubscriptionFailure(_) => BringupState::Subscribing,
            BringupError::RuntimeInitFailure(_) | BringupError::DriverInitFailure(_) => {
                BringupState::Initializing
            }
            BringupError::LinkWaitFailure(_) => BringupState::AwaitingLink,
            BringupError::WorkerStartFailure(_) => BringupState::StartingWorker,
            BringupError::VersionQueryFailure(_) => BringupState::ReportingVersion,
        }
    }

    pub(crate) fn allocation(
        resource: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BringupError::AllocationFailure {
            resource,
            source: Box::new(source),
        }
    }
}

/// Result type for bring-up operations
pub type Result<T> = std::result::Result<T, BringupError>;
