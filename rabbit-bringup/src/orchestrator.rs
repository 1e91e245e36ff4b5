//! Bring-up orchestrator
//!
//! Drives the device from power-on to a running audio worker:
//!
//! 1. allocate the device context and connectivity signal
//! 2. register the network status handler
//! 3. initialize the platform runtime and board driver
//! 4. block until the link is up
//! 5. launch the audio worker
//! 6. report firmware versions (non-fatal)
//!
//! Whatever happens, the handler is removed and the signal destroyed exactly
//! once before the orchestrating task ends.

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use device_platform::{AppConfig, FirmwareInfo, NotificationKind, WorkerHandle};
use link_signal::SignalError;
use serde::Serialize;

use crate::config::{BringupConfig, ConfigError};
use crate::error::{BringupError, Result};
use crate::handler::link_up_handler;
use crate::initializer::SubsystemInitializer;
use crate::logging::APP_TARGET;
use crate::reporter::{VersionReport, VersionReporter};
use crate::services::BringupServices;
use crate::state::{BringupState, StateMachine};
use crate::teardown::{Teardown, TeardownReport};

/// Outcome of one bring-up attempt
#[derive(Debug)]
pub struct BringupReport {
    /// `Done` on success, `Terminated` after an abort
    pub terminal_state: BringupState,
    /// Every state entered, in order
    pub trace: Vec<BringupState>,
    /// The fatal error, if bring-up aborted
    pub failure: Option<BringupError>,
    /// Firmware query error, if reporting failed
    pub version_error: Option<BringupError>,
    pub firmware: Option<FirmwareInfo>,
    /// Rendered firmware record as logged
    pub diagnostic_record: Option<String>,
    /// Config restored into the device context
    pub config: Option<AppConfig>,
    /// The launched worker; dropping it detaches the worker
    pub worker: Option<WorkerHandle>,
    pub teardown: TeardownReport,
    pub elapsed: Duration,
}

impl BringupReport {
    pub fn succeeded(&self) -> bool {
        self.terminal_state == BringupState::Done
    }

    /// Whether the sequence ever entered `state`
    pub fn entered(&self, state: BringupState) -> bool {
        self.trace.contains(&state)
    }

    /// Serializable view of this report
    pub fn summary(&self) -> BringupSummary {
        BringupSummary {
            terminal_state: self.terminal_state,
            trace: self.trace.clone(),
            failure: self.failure.as_ref().map(ToString::to_string),
            version_error: self.version_error.as_ref().map(ToString::to_string),
            firmware: self.firmware.clone(),
            teardown: self.teardown,
            elapsed_ms: self.elapsed.as_millis(),
        }
    }
}

/// JSON-friendly summary of a [`BringupReport`]
#[derive(Debug, Clone, Serialize)]
pub struct BringupSummary {
    pub terminal_state: BringupState,
    pub trace: Vec<BringupState>,
    pub failure: Option<String>,
    pub version_error: Option<String>,
    pub firmware: Option<FirmwareInfo>,
    pub teardown: TeardownReport,
    pub elapsed_ms: u128,
}

/// What a successful sequence hands back to `run`
struct Completed {
    config: AppConfig,
    worker: WorkerHandle,
    version: std::result::Result<VersionReport, BringupError>,
}

/// Sequences device bring-up on a dedicated task
///
/// # Example
///
/// ```rust,ignore
/// use device_platform::sim::SimPlatform;
/// use rabbit_bringup::{BringupConfig, BringupServices, Orchestrator};
///
/// let platform = SimPlatform::new()?;
/// let orchestrator = Orchestrator::new(
///     BringupConfig::default(),
///     BringupServices::from_sim(&platform),
/// )?;
///
/// let report = orchestrator.spawn()?.join().expect("bring-up task panicked");
/// assert!(report.succeeded());
/// ```
pub struct Orchestrator {
    config: BringupConfig,
    services: BringupServices,
}

impl Orchestrator {
    pub fn new(config: BringupConfig, services: BringupServices) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, services })
    }

    pub fn config(&self) -> &BringupConfig {
        &self.config
    }

    /// Run bring-up on a new thread named after `task_name`
    ///
    /// The thread ends once bring-up finishes; joining it yields the report.
    pub fn spawn(self) -> io::Result<JoinHandle<BringupReport>> {
        thread::Builder::new()
            .name(self.config.task_name.clone())
            .spawn(move || self.run())
    }

    /// Run bring-up on the current thread
    pub fn run(self) -> BringupReport {
        let started = Instant::now();
        let mut machine = StateMachine::new();
        let mut teardown = Teardown::new(self.services.notifications.clone());

        tracing::info!("Bring-up starting on task {:?}", self.config.task_name);
        let outcome = self.sequence(&mut machine, &mut teardown);

        let mut report = BringupReport {
            terminal_state: BringupState::Allocating,
            trace: Vec::new(),
            failure: None,
            version_error: None,
            firmware: None,
            diagnostic_record: None,
            config: None,
            worker: None,
            teardown: TeardownReport::default(),
            elapsed: Duration::ZERO,
        };

        match outcome {
            Ok(completed) => {
                match completed.version {
                    Ok(version) => {
                        report.firmware = Some(version.info);
                        report.diagnostic_record = Some(version.record);
                    }
                    Err(e) => report.version_error = Some(e),
                }
                report.config = Some(completed.config);
                report.worker = Some(completed.worker);
                machine.advance();
                report.teardown = teardown.run();
            }
            Err(e) => {
                tracing::error!("Bring-up failed in {}: {}", machine.current(), e);
                machine.abort();
                report.teardown = teardown.run();
                machine.advance();
                report.failure = Some(e);
            }
        }

        report.terminal_state = machine.current();
        report.trace = machine.trace().to_vec();
        report.elapsed = started.elapsed();

        tracing::info!(
            "Bring-up task terminating in {} after {:?}",
            report.terminal_state,
            report.elapsed
        );
        report
    }

    fn sequence(&self, machine: &mut StateMachine, teardown: &mut Teardown) -> Result<Completed> {
        let init = SubsystemInitializer::new(&self.services)
            .with_config_path(self.config.config_path.as_deref());

        // Allocating
        let allocated = init.allocate()?;
        let mut context = allocated.context;
        let notifier = allocated.signal.notifier();
        teardown.track_signal(allocated.signal);

        // Subscribing
        machine.advance();
        let kind = NotificationKind::WifiStatusChanged;
        let id = self
            .services
            .notifications
            .subscribe(kind, link_up_handler(notifier))
            .map_err(BringupError::SubscriptionFailure)?;
        teardown.track_subscription(kind, id);

        // Initializing
        machine.advance();
        init.initialize(&mut context)?;

        // AwaitingLink
        machine.advance();
        tracing::info!("Waiting for network link (timeout: {})", self.config.link_timeout);
        teardown
            .signal()
            .ok_or(SignalError::Destroyed)
            .and_then(|signal| signal.wait(self.config.link_timeout))
            .map_err(BringupError::LinkWaitFailure)?;
        tracing::info!(target: APP_TARGET, "wifi connected successful");

        // StartingWorker
        machine.advance();
        let worker = self
            .services
            .worker
            .start(&self.config.worker_name)
            .map_err(BringupError::WorkerStartFailure)?;
        tracing::debug!("Worker {:?} started", worker.name());

        // ReportingVersion
        machine.advance();
        let version = VersionReporter::new(self.services.firmware.as_ref()).report();
        if let Err(e) = &version {
            tracing::warn!("{}", e);
        }

        Ok(Completed {
            config: context.config().clone(),
            worker,
            version,
        })
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
