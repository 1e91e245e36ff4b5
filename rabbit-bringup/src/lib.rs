//! # Rabbit Bring-up
//!
//! Power-on sequencing for the rabbit network audio device.
//!
//! A single [`Orchestrator`] task takes the device from nothing to a running
//! audio worker, then exits. Every subsystem it touches sits behind a trait
//! from `device_platform`, so the same sequence runs against real hardware
//! bindings or the in-process simulator.
//!
//! ## Sequence
//!
//! ```text
//! allocate context + signal
//!         │
//! subscribe WifiStatusChanged ──► handler: StationUp ⇒ signal
//!         │
//! runtime.init → driver.init
//!         │
//! wait(signal)  ◄── blocks until link-up
//!         │
//! worker.start → firmware report
//!         │
//! teardown (unsubscribe, destroy signal)
//! ```
//!
//! A failure at any step aborts the rest; teardown still runs exactly once.
//! A failed firmware query is logged and ignored.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use device_platform::sim::SimPlatform;
//! use rabbit_bringup::prelude::*;
//!
//! let platform = SimPlatform::new()?;
//! let report = Orchestrator::new(BringupConfig::default(), BringupServices::from_sim(&platform))?
//!     .spawn()?
//!     .join()
//!     .expect("bring-up task panicked");
//!
//! assert_eq!(report.terminal_state, BringupState::Done);
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod initializer;
pub mod logging;
pub mod orchestrator;
pub mod reporter;
pub mod services;
pub mod state;
pub mod teardown;

// Re-export main types for convenience
pub use config::{BringupConfig, ConfigError};
pub use error::{BringupError, Result};
pub use handler::{link_up_handler, on_network_status};
pub use initializer::{Allocated, SubsystemInitializer};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode, APP_TARGET};
pub use orchestrator::{BringupReport, BringupSummary, Orchestrator};
pub use reporter::{VersionReport, VersionReporter};
pub use services::{BringupServices, BringupServicesBuilder};
pub use state::{BringupState, StateMachine};
pub use teardown::{Teardown, TeardownReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BringupConfig, BringupError, BringupReport, BringupServices, BringupState, Orchestrator,
        TeardownReport,
    };
}
