//! Device context and persisted application config

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Application config restored from persistent storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Layout version of the stored blob
    pub config_version: u32,

    /// Name the device announces on the network
    pub device_name: String,

    /// Playback volume, 0-100
    pub volume: u8,

    /// Network the station interface joins
    pub wifi_ssid: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: 1,
            device_name: "alilo-rabbit".to_string(),
            volume: 60,
            wifi_ssid: None,
        }
    }
}

/// Lifecycle of a [`DeviceContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Allocated, config not yet restored
    Allocated,
    /// Runtime initialized with this context
    Ready,
    /// A later initialization step failed
    Invalid,
}

/// Per-device state owned by the bring-up task
#[derive(Debug)]
pub struct DeviceContext {
    config: AppConfig,
    state: ContextState,
    restored_from_storage: bool,
}

impl DeviceContext {
    /// Create a freshly allocated context holding default config
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            state: ContextState::Allocated,
            restored_from_storage: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Whether config came from storage rather than defaults
    pub fn restored_from_storage(&self) -> bool {
        self.restored_from_storage
    }

    /// Install config read from storage
    pub fn restore(&mut self, config: AppConfig) {
        self.config = config;
        self.restored_from_storage = true;
    }

    /// Mark the context usable by later subsystems
    pub fn mark_ready(&mut self) {
        self.state = ContextState::Ready;
    }

    /// Mark the context unusable after a failed initialization
    pub fn invalidate(&mut self) {
        self.state = ContextState::Invalid;
    }

    pub fn is_ready(&self) -> bool {
        self.state == ContextState::Ready
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocates the device context
pub trait ContextAllocator: Send + Sync {
    fn allocate(&self) -> Result<DeviceContext>;
}
