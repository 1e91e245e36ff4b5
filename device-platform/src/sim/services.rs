//! Simulated implementations of each platform service

use std::fs;
use std::mem;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::fault::FaultSwitch;
use crate::context::{AppConfig, ContextAllocator, DeviceContext};
use crate::error::{PlatformError, Result};
use crate::event::{NetworkStatus, Notification, NotificationKind};
use crate::firmware::{FirmwareInfo, FirmwareName, HardwareVersion, VersionTriple};
use crate::notify::{HandlerId, NotificationCenter, NotificationHandler, NotificationService};
use crate::services::{FirmwareSource, HardwareDriver, PlatformRuntime, WorkerHandle, WorkerLauncher};

/// Heap available to the simulated allocator by default
pub const DEFAULT_HEAP_BUDGET: usize = 64 * 1024;

// ============================================================================
// Allocator
// ============================================================================

/// Allocator with a fixed heap budget
#[derive(Debug)]
pub struct SimAllocator {
    heap_budget: AtomicUsize,
    fault: FaultSwitch,
}

impl SimAllocator {
    pub fn new(heap_budget: usize) -> Self {
        Self {
            heap_budget: AtomicUsize::new(heap_budget),
            fault: FaultSwitch::new(),
        }
    }

    /// Shrink or grow the heap; a budget below the context size forces out-of-memory
    pub fn set_heap_budget(&self, bytes: usize) {
        self.heap_budget.store(bytes, Ordering::SeqCst);
    }

    pub fn fault(&self) -> &FaultSwitch {
        &self.fault
    }
}

impl Default for SimAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_HEAP_BUDGET)
    }
}

impl ContextAllocator for SimAllocator {
    fn allocate(&self) -> Result<DeviceContext> {
        let requested = mem::size_of::<DeviceContext>();
        let available = if self.fault.hit() {
            0
        } else {
            self.heap_budget.load(Ordering::SeqCst)
        };

        if requested > available {
            return Err(PlatformError::OutOfMemory {
                requested,
                available,
            });
        }

        Ok(DeviceContext::new())
    }
}

// ============================================================================
// Runtime
// ============================================================================

/// A network transition the simulated Wi-Fi stack emits after runtime init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedTransition {
    pub status: NetworkStatus,
    pub delay: Duration,
}

impl ScriptedTransition {
    pub fn new(status: NetworkStatus, delay: Duration) -> Self {
        Self { status, delay }
    }
}

/// Runtime that restores config from a JSON file and then "associates"
///
/// Association posts the scripted network transitions, so a link-up only
/// ever happens after `init()`.
pub struct SimRuntime {
    center: Arc<NotificationCenter>,
    link_script: Mutex<Vec<ScriptedTransition>>,
    fault: FaultSwitch,
}

impl SimRuntime {
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self {
            center,
            link_script: Mutex::new(vec![ScriptedTransition::new(
                NetworkStatus::StationUp,
                Duration::from_millis(50),
            )]),
            fault: FaultSwitch::new(),
        }
    }

    /// Replace the transitions posted after `init()`; empty means the link never comes up
    pub fn set_link_script(&self, script: Vec<ScriptedTransition>) {
        *self.link_script.lock() = script;
    }

    pub fn fault(&self) -> &FaultSwitch {
        &self.fault
    }

    fn load_config(path: &Path) -> Result<Option<AppConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(path).map_err(|e| PlatformError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PlatformError::ConfigLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl PlatformRuntime for SimRuntime {
    fn init(&self, ctx: &mut DeviceContext, config_path: Option<&Path>) -> Result<()> {
        if self.fault.hit() {
            return Err(PlatformError::RuntimeInit("injected fault".to_string()));
        }

        match config_path {
            Some(path) => match Self::load_config(path)? {
                Some(config) => {
                    tracing::debug!("Restored config from {}", path.display());
                    ctx.restore(config);
                }
                None => {
                    tracing::debug!("No config at {}, using defaults", path.display());
                }
            },
            None => tracing::debug!("No config path set, using defaults"),
        }
        ctx.mark_ready();

        for step in self.link_script.lock().iter() {
            self.center
                .post_after(Notification::WifiStatus(step.status), step.delay)?;
        }

        tracing::info!("Platform runtime initialized");
        Ok(())
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Notification service with injectable subscribe failures
pub struct SimNotifications {
    center: Arc<NotificationCenter>,
    subscribe_fault: FaultSwitch,
    unsubscribe_calls: AtomicU32,
}

impl SimNotifications {
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self {
            center,
            subscribe_fault: FaultSwitch::new(),
            unsubscribe_calls: AtomicU32::new(0),
        }
    }

    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    pub fn subscribe_fault(&self) -> &FaultSwitch {
        &self.subscribe_fault
    }

    pub fn unsubscribe_calls(&self) -> u32 {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    /// Deliver a network transition right away
    pub fn post_status(&self, status: NetworkStatus) -> Result<()> {
        self.center.post(Notification::WifiStatus(status))
    }
}

impl NotificationService for SimNotifications {
    fn subscribe(&self, kind: NotificationKind, handler: NotificationHandler) -> Result<HandlerId> {
        if self.subscribe_fault.hit() {
            return Err(PlatformError::SubscriptionRejected {
                kind,
                reason: "injected fault".to_string(),
            });
        }
        self.center.subscribe(kind, handler)
    }

    fn unsubscribe(&self, kind: NotificationKind, id: HandlerId) -> bool {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.center.unsubscribe(kind, id)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Board driver that succeeds unless a fault is injected
#[derive(Debug, Default)]
pub struct SimDriver {
    fault: FaultSwitch,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fault(&self) -> &FaultSwitch {
        &self.fault
    }
}

impl HardwareDriver for SimDriver {
    fn init(&self) -> Result<()> {
        if self.fault.hit() {
            return Err(PlatformError::DriverInit("injected fault".to_string()));
        }
        tracing::debug!("Board driver initialized");
        Ok(())
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Body of a simulated worker
pub type WorkerJob = Arc<dyn Fn() + Send + Sync>;

/// Launches the worker job on a named thread
pub struct SimWorkerLauncher {
    job: Mutex<WorkerJob>,
    fault: FaultSwitch,
}

impl SimWorkerLauncher {
    pub fn new() -> Self {
        Self {
            job: Mutex::new(Arc::new(|| {
                let current = thread::current();
                tracing::info!("{} worker running", current.name().unwrap_or("unnamed"));
            })),
            fault: FaultSwitch::new(),
        }
    }

    /// Replace the code the worker thread runs
    pub fn set_job(&self, job: WorkerJob) {
        *self.job.lock() = job;
    }

    pub fn fault(&self) -> &FaultSwitch {
        &self.fault
    }
}

impl Default for SimWorkerLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerLauncher for SimWorkerLauncher {
    fn start(&self, name: &str) -> Result<WorkerHandle> {
        if self.fault.hit() {
            return Err(PlatformError::WorkerStart("injected fault".to_string()));
        }

        let job = Arc::clone(&*self.job.lock());
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || (*job)())
            .map_err(|e| PlatformError::WorkerStart(e.to_string()))?;

        Ok(WorkerHandle::from_thread(name, thread))
    }
}

// ============================================================================
// Firmware
// ============================================================================

/// Firmware source answering with a fixed record
#[derive(Debug)]
pub struct SimFirmware {
    info: Mutex<Option<FirmwareInfo>>,
    fault: FaultSwitch,
}

impl SimFirmware {
    pub fn new(info: Option<FirmwareInfo>) -> Self {
        Self {
            info: Mutex::new(info),
            fault: FaultSwitch::new(),
        }
    }

    /// Record the simulated audio subsystem reports
    pub fn sample_info() -> FirmwareInfo {
        let mx1200 = "MX1200_RABBIT_V1.4.2.bin";
        let sound_remind = "SOUND_REMIND_V1.0.7.bin";
        FirmwareInfo {
            mx1200_version: VersionTriple::new(1, 4, 2),
            sound_remind_version: VersionTriple::new(1, 0, 7),
            hardware_version: HardwareVersion::new(2, 1),
            mx1200_fw_name: FirmwareName::from_raw(mx1200.as_bytes(), mx1200.len()),
            sound_remind_fw_name: FirmwareName::from_raw(
                sound_remind.as_bytes(),
                sound_remind.len(),
            ),
        }
    }

    /// Change the reported record; `None` makes queries fail
    pub fn set_info(&self, info: Option<FirmwareInfo>) {
        *self.info.lock() = info;
    }

    pub fn fault(&self) -> &FaultSwitch {
        &self.fault
    }
}

impl Default for SimFirmware {
    fn default() -> Self {
        Self::new(Some(Self::sample_info()))
    }
}

impl FirmwareSource for SimFirmware {
    fn query(&self) -> Result<FirmwareInfo> {
        if self.fault.hit() {
            return Err(PlatformError::FirmwareQuery("injected fault".to_string()));
        }
        self.info
            .lock()
            .clone()
            .ok_or_else(|| PlatformError::FirmwareQuery("audio subsystem did not answer".to_string()))
    }
}
