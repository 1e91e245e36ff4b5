//! In-process simulated platform
//!
//! Bundles one simulated implementation of every platform service so the
//! bring-up sequence can run on a host. Each service counts its calls and
//! can be told to fail.

mod fault;
mod services;

use std::sync::Arc;

pub use fault::FaultSwitch;
pub use services::{
    ScriptedTransition, SimAllocator, SimDriver, SimFirmware, SimNotifications, SimRuntime,
    SimWorkerLauncher, WorkerJob, DEFAULT_HEAP_BUDGET,
};

use crate::error::Result;
use crate::notify::NotificationCenter;

/// Simulated device platform
///
/// # Example
///
/// ```rust,ignore
/// use device_platform::sim::SimPlatform;
///
/// let platform = SimPlatform::new()?;
/// platform.driver().fault().set_failing(true);
/// ```
pub struct SimPlatform {
    center: Arc<NotificationCenter>,
    allocator: Arc<SimAllocator>,
    runtime: Arc<SimRuntime>,
    notifications: Arc<SimNotifications>,
    driver: Arc<SimDriver>,
    worker: Arc<SimWorkerLauncher>,
    firmware: Arc<SimFirmware>,
}

impl SimPlatform {
    /// Create a platform whose link comes up shortly after runtime init
    pub fn new() -> Result<Self> {
        let center = Arc::new(NotificationCenter::new()?);

        Ok(Self {
            allocator: Arc::new(SimAllocator::default()),
            runtime: Arc::new(SimRuntime::new(Arc::clone(&center))),
            notifications: Arc::new(SimNotifications::new(Arc::clone(&center))),
            driver: Arc::new(SimDriver::new()),
            worker: Arc::new(SimWorkerLauncher::new()),
            firmware: Arc::new(SimFirmware::default()),
            center,
        })
    }

    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    pub fn allocator(&self) -> &Arc<SimAllocator> {
        &self.allocator
    }

    pub fn runtime(&self) -> &Arc<SimRuntime> {
        &self.runtime
    }

    pub fn notifications(&self) -> &Arc<SimNotifications> {
        &self.notifications
    }

    pub fn driver(&self) -> &Arc<SimDriver> {
        &self.driver
    }

    pub fn worker(&self) -> &Arc<SimWorkerLauncher> {
        &self.worker
    }

    pub fn firmware(&self) -> &Arc<SimFirmware> {
        &self.firmware
    }
}
