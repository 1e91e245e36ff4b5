//! The set of platform services a bring-up attempt drives

use std::sync::Arc;

use device_platform::sim::SimPlatform;
use device_platform::{
    ContextAllocator, FirmwareSource, HardwareDriver, NotificationService, PlatformRuntime,
    WorkerLauncher,
};

use crate::config::ConfigError;

/// Platform services used by the orchestrator
#[derive(Clone)]
pub struct BringupServices {
    pub allocator: Arc<dyn ContextAllocator>,
    pub notifications: Arc<dyn NotificationService>,
    pub runtime: Arc<dyn PlatformRuntime>,
    pub driver: Arc<dyn HardwareDriver>,
    pub worker: Arc<dyn WorkerLauncher>,
    pub firmware: Arc<dyn FirmwareSource>,
}

impl BringupServices {
    pub fn builder() -> BringupServicesBuilder {
        BringupServicesBuilder::default()
    }

    /// Wire every service to the simulated platform
    pub fn from_sim(platform: &SimPlatform) -> Self {
        Self {
            allocator: platform.allocator().clone(),
            notifications: platform.notifications().clone(),
            runtime: platform.runtime().clone(),
            driver: platform.driver().clone(),
            worker: platform.worker().clone(),
            firmware: platform.firmware().clone(),
        }
    }
}

/// Builder for [`BringupServices`]
#[derive(Default)]
pub struct BringupServicesBuilder {
    allocator: Option<Arc<dyn ContextAllocator>>,
    notifications: Option<Arc<dyn NotificationService>>,
    runtime: Option<Arc<dyn PlatformRuntime>>,
    driver: Option<Arc<dyn HardwareDriver>>,
    worker: Option<Arc<dyn WorkerLauncher>>,
    firmware: Option<Arc<dyn FirmwareSource>>,
}

impl BringupServicesBuilder {
    pub fn with_allocator(mut self, allocator: Arc<dyn ContextAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn PlatformRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_driver(mut self, driver: Arc<dyn HardwareDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_worker(mut self, worker: Arc<dyn WorkerLauncher>) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn with_firmware(mut self, firmware: Arc<dyn FirmwareSource>) -> Self {
        self.firmware = Some(firmware);
        self
    }

    /// Build, failing on the first service that was not provided
    pub fn build(self) -> Result<BringupServices, ConfigError> {
        Ok(BringupServices {
            allocator: self.allocator.ok_or(ConfigError::MissingService("allocator"))?,
            notifications: self
                .notifications
                .ok_or(ConfigError::MissingService("notifications"))?,
            runtime: self.runtime.ok_or(ConfigError::MissingService("runtime"))?,
            driver: self.driver.ok_or(ConfigError::MissingService("driver"))?,
            worker: self.worker.ok_or(ConfigError::MissingService("worker"))?,
            firmware: self.firmware.ok_or(ConfigError::MissingService("firmware"))?,
        })
    }
}
