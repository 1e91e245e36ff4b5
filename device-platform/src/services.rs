//! Contracts for the subsystems bring-up drives
//!
//! Each service is called once, synchronously, from the bring-up task.

use std::fmt;
use std::path::Path;
use std::thread::JoinHandle;

use crate::context::DeviceContext;
use crate::error::Result;
use crate::firmware::FirmwareInfo;

/// Platform runtime (RTOS services, persisted config, network stack)
pub trait PlatformRuntime: Send + Sync {
    /// Start the runtime, restoring persisted config from `config_path` into `ctx`
    ///
    /// `None` (or a missing file) leaves the context on defaults.
    fn init(&self, ctx: &mut DeviceContext, config_path: Option<&Path>) -> Result<()>;
}

/// Board hardware-abstraction driver
pub trait HardwareDriver: Send + Sync {
    fn init(&self) -> Result<()>;
}

/// Launches the long-running audio worker
pub trait WorkerLauncher: Send + Sync {
    /// Launch the worker under `name`
    fn start(&self, name: &str) -> Result<WorkerHandle>;
}

/// Reads version metadata from the audio subsystem
pub trait FirmwareSource: Send + Sync {
    fn query(&self) -> Result<FirmwareInfo>;
}

/// Handle to a launched worker
///
/// Dropping the handle detaches the worker.
pub struct WorkerHandle {
    name: String,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Handle for a worker running on a thread
    pub fn from_thread(name: impl Into<String>, thread: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            thread: Some(thread),
        }
    }

    /// Handle for a worker the platform schedules itself
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thread: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(false, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit
    ///
    /// Returns `false` if the worker panicked.
    pub fn join(mut self) -> bool {
        match self.thread.take() {
            Some(thread) => thread.join().is_ok(),
            None => true,
        }
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.name)
            .field("attached", &self.thread.is_some())
            .finish()
    }
}
