//! # Device Platform
//!
//! Contracts for the platform services a rabbit device brings up, plus a
//! simulated platform that runs them in-process.
//!
//! ## Overview
//!
//! Bring-up treats every subsystem as an opaque service behind a trait:
//!
//! - **ContextAllocator**: allocates the `DeviceContext`
//! - **NotificationService**: subscribe/unsubscribe handlers for platform notifications
//! - **PlatformRuntime**: starts the runtime and restores persisted `AppConfig`
//! - **HardwareDriver**: board driver `init()`
//! - **WorkerLauncher**: starts the long-running audio worker
//! - **FirmwareSource**: reads `FirmwareInfo` from the audio subsystem
//!
//! ## Notifications
//!
//! `NotificationCenter` delivers notifications on a dedicated dispatch thread
//! (a current-thread tokio runtime). Handlers run on that thread and must not
//! block.
//!
//! ```rust,ignore
//! use device_platform::prelude::*;
//! use std::sync::Arc;
//!
//! let center = NotificationCenter::new()?;
//! let id = center.subscribe(
//!     NotificationKind::WifiStatusChanged,
//!     Arc::new(|n: &Notification| {
//!         if n.network_status() == Some(NetworkStatus::StationUp) {
//!             // link is up
//!         }
//!     }),
//! )?;
//!
//! center.post(NetworkStatus::StationUp.into())?;
//! center.unsubscribe(NotificationKind::WifiStatusChanged, id);
//! ```
//!
//! ## Simulation
//!
//! `sim::SimPlatform` implements every contract with call counters and
//! injectable faults, and its runtime posts a scripted link-up after `init()`.

pub mod context;
mod dispatch;
pub mod error;
pub mod event;
pub mod firmware;
pub mod notify;
pub mod services;
pub mod sim;

// Re-export main types for convenience
pub use context::{AppConfig, ContextAllocator, ContextState, DeviceContext};
pub use error::{PlatformError, Result};
pub use event::{NetworkStatus, Notification, NotificationKind};
pub use firmware::{FirmwareInfo, FirmwareName, HardwareVersion, VersionTriple, FIRMWARE_NAME_CAPACITY};
pub use notify::{HandlerId, NotificationCenter, NotificationHandler, NotificationService};
pub use services::{FirmwareSource, HardwareDriver, PlatformRuntime, WorkerHandle, WorkerLauncher};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ContextAllocator, DeviceContext, FirmwareInfo, FirmwareSource, HardwareDriver,
        NetworkStatus, Notification, NotificationCenter, NotificationKind, NotificationService,
        PlatformError, PlatformRuntime, Result, WorkerLauncher,
    };
}
