use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use device_platform::sim::{ScriptedTransition, SimPlatform};
use device_platform::NetworkStatus;
use link_signal::WaitTimeout;
use rabbit_bringup::{init_logging, BringupConfig, BringupServices, LoggingMode, Orchestrator};

/// Rabbit bring-up simulator
///
/// Runs the device bring-up sequence against the in-process simulated
/// platform. Faults can be injected into any service to exercise the abort
/// and teardown paths.
#[derive(Parser, Debug)]
#[command(name = "rabbit-sim")]
#[command(about = "Run the rabbit device bring-up sequence against a simulated platform")]
#[command(version)]
pub struct Args {
    /// Delay before the simulated station link comes up, in milliseconds
    #[arg(short = 'd', long, default_value = "50")]
    pub link_delay_ms: u64,

    /// Give up waiting for the link after this many milliseconds (0 = forever)
    #[arg(short = 't', long)]
    pub link_timeout_ms: Option<u64>,

    /// Persisted application config (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Inject a failure into a platform service (repeatable)
    #[arg(long, value_enum)]
    pub fail: Vec<FaultPoint>,

    /// Never bring the link up
    #[arg(long)]
    pub never_link: bool,

    /// Emit access-point and station-down transitions before the link-up
    #[arg(long)]
    pub flap: bool,

    /// Print the bring-up summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

/// Platform service a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FaultPoint {
    Allocation,
    Subscription,
    Runtime,
    Driver,
    Worker,
    Firmware,
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.never_link && self.link_timeout_ms.unwrap_or(0) == 0 {
            warn!("--never-link without --link-timeout-ms will wait forever");
        }
        Ok(())
    }

    fn link_script(&self) -> Vec<ScriptedTransition> {
        if self.never_link {
            return Vec::new();
        }

        let delay = Duration::from_millis(self.link_delay_ms);
        let mut script = Vec::new();
        if self.flap {
            let step = delay / 4;
            script.push(ScriptedTransition::new(NetworkStatus::AccessPointUp, step));
            script.push(ScriptedTransition::new(NetworkStatus::StationDown, step * 2));
            script.push(ScriptedTransition::new(NetworkStatus::AccessPointDown, step * 3));
        }
        script.push(ScriptedTransition::new(NetworkStatus::StationUp, delay));
        script
    }

    fn bringup_config(&self) -> Result<BringupConfig> {
        let mut config = BringupConfig::from_env().context("Invalid RABBIT_* environment")?;

        if let Some(ms) = self.link_timeout_ms {
            config = config.with_link_timeout(WaitTimeout::from_millis(ms));
        }
        if let Some(path) = &self.config {
            config = config.with_config_path(path);
        }

        Ok(config)
    }

    fn platform(&self) -> Result<SimPlatform> {
        let platform = SimPlatform::new().context("Failed to start simulated platform")?;
        platform.runtime().set_link_script(self.link_script());

        for fault in &self.fail {
            match fault {
                FaultPoint::Allocation => platform.allocator().fault().set_failing(true),
                FaultPoint::Subscription => {
                    platform.notifications().subscribe_fault().set_failing(true)
                }
                FaultPoint::Runtime => platform.runtime().fault().set_failing(true),
                FaultPoint::Driver => platform.driver().fault().set_failing(true),
                FaultPoint::Worker => platform.worker().fault().set_failing(true),
                FaultPoint::Firmware => platform.firmware().fault().set_failing(true),
            }
        }

        Ok(platform)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mode = if args.verbose {
        LoggingMode::Debug
    } else {
        LoggingMode::Development
    };
    init_logging(mode).context("Failed to initialize logging")?;

    args.validate()?;

    let config = args.bringup_config()?;
    let platform = args.platform()?;
    info!(
        "Starting bring-up (link timeout: {}, faults: {:?})",
        config.link_timeout, args.fail
    );

    let orchestrator = Orchestrator::new(config, BringupServices::from_sim(&platform))
        .context("Invalid bring-up configuration")?;
    let mut report = orchestrator
        .spawn()
        .context("Failed to spawn bring-up task")?
        .join()
        .map_err(|_| anyhow::anyhow!("Bring-up task panicked"))?;

    if args.json {
        let summary = serde_json::to_string_pretty(&report.summary())
            .context("Failed to serialize bring-up summary")?;
        println!("{summary}");
    }

    if let Some(worker) = report.worker.take() {
        let name = worker.name().to_string();
        if !worker.join() {
            warn!("Worker {} panicked", name);
        }
    }

    platform.center().shutdown();

    match report.failure {
        Some(err) => Err(anyhow::Error::new(err).context(format!(
            "Bring-up terminated after {:?}",
            report.elapsed
        ))),
        None => {
            info!("Bring-up finished in {:?}", report.elapsed);
            Ok(())
        }
    }
}
