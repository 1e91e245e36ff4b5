//! Ordered, fail-fast subsystem initialization
//!
//! Steps, in order:
//! 1. allocate the device context
//! 2. create the connectivity signal
//! 3. start the platform runtime with the context (restores persisted config
//!    from the configured path)
//! 4. initialize the board driver
//!
//! Steps 1-2 and 3-4 are exposed separately so the orchestrator can register
//! its network handler in between, before anything can raise a link-up.

use std::path::Path;

use device_platform::DeviceContext;
use link_signal::ConnectivitySignal;

use crate::error::{BringupError, Result};
use crate::services::BringupServices;

/// Resources produced by the allocation phase
#[derive(Debug)]
pub struct Allocated {
    pub context: DeviceContext,
    pub signal: ConnectivitySignal,
}

/// Runs the initialization steps against a set of platform services
pub struct SubsystemInitializer<'a> {
    services: &'a BringupServices,
    config_path: Option<&'a Path>,
}

impl<'a> SubsystemInitializer<'a> {
    pub fn new(services: &'a BringupServices) -> Self {
        Self {
            services,
            config_path: None,
        }
    }

    /// Persisted config the runtime restores during `initialize`
    pub fn with_config_path(mut self, path: Option<&'a Path>) -> Self {
        self.config_path = path;
        self
    }

    /// Steps 1-2: allocate the context and create an unsignaled signal
    pub fn allocate(&self) -> Result<Allocated> {
        let context = self
            .services
            .allocator
            .allocate()
            .map_err(|e| BringupError::allocation("device context", e))?;

        let signal = ConnectivitySignal::create(0)
            .map_err(|e| BringupError::allocation("connectivity signal", e))?;

        tracing::debug!("Device context and connectivity signal allocated");
        Ok(Allocated { context, signal })
    }

    /// Steps 3-4: runtime then driver
    ///
    /// The driver is not touched if the runtime fails. On any failure the
    /// context is marked invalid.
    pub fn initialize(&self, context: &mut DeviceContext) -> Result<()> {
        if let Err(e) = self.services.runtime.init(context, self.config_path) {
            context.invalidate();
            return Err(BringupError::RuntimeInitFailure(e));
        }

        if let Err(e) = self.services.driver.init() {
            context.invalidate();
            return Err(BringupError::DriverInitFailure(e));
        }

        tracing::debug!(
            "Subsystems initialized (config restored: {})",
            context.restored_from_storage()
        );
        Ok(())
    }

    /// All four steps back to back, for callers that subscribe elsewhere
    pub fn run_all(&self) -> Result<Allocated> {
        let mut allocated = self.allocate()?;
        self.initialize(&mut allocated.context)?;
        Ok(allocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_platform::sim::SimPlatform;
    use device_platform::ContextState;

    fn quiet_platform() -> SimPlatform {
        let platform = SimPlatform::new().unwrap();
        platform.runtime().set_link_script(Vec::new());
        platform
    }

    #[test]
    fn test_run_all_succeeds() {
        let platform = quiet_platform();
        let services = BringupServices::from_sim(&platform);

        let allocated = SubsystemInitializer::new(&services).run_all().unwrap();
        assert!(allocated.context.is_ready());
        assert!(!allocated.signal.is_signaled());
        assert_eq!(platform.driver().fault().calls(), 1);
    }

    #[test]
    fn test_allocation_failure_skips_everything_else() {
        let platform = quiet_platform();
        platform.allocator().set_heap_budget(0);
        let services = BringupServices::from_sim(&platform);

        let err = SubsystemInitializer::new(&services).run_all().unwrap_err();
        assert!(matches!(err, BringupError::AllocationFailure { .. }));
        assert_eq!(platform.runtime().fault().calls(), 0);
        assert_eq!(platform.driver().fault().calls(), 0);
    }

    #[test]
    fn test_runtime_failure_skips_driver() {
        let platform = quiet_platform();
        platform.runtime().fault().set_failing(true);
        let services = BringupServices::from_sim(&platform);
        let init = SubsystemInitializer::new(&services);

        let mut allocated = init.allocate().unwrap();
        let err = init.initialize(&mut allocated.context).unwrap_err();

        assert!(matches!(err, BringupError::RuntimeInitFailure(_)));
        assert_eq!(platform.driver().fault().calls(), 0);
        assert_eq!(allocated.context.state(), ContextState::Invalid);
    }

    #[test]
    fn test_driver_failure_invalidates_context() {
        let platform = quiet_platform();
        platform.driver().fault().set_failing(true);
        let services = BringupServices::from_sim(&platform);
        let init = SubsystemInitializer::new(&services);

        let mut allocated = init.allocate().unwrap();
        let err = init.initialize(&mut allocated.context).unwrap_err();

        assert!(matches!(err, BringupError::DriverInitFailure(_)));
        assert_eq!(platform.runtime().fault().calls(), 1);
        assert_eq!(allocated.context.state(), ContextState::Invalid);
    }

    #[test]
    fn test_config_path_reaches_runtime() {
        let path = std::env::temp_dir().join(format!(
            "rabbit-initializer-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"device_name": "hall-rabbit"}"#).unwrap();

        let platform = quiet_platform();
        let services = BringupServices::from_sim(&platform);
        let allocated = SubsystemInitializer::new(&services)
            .with_config_path(Some(path.as_path()))
            .run_all()
            .unwrap();

        assert!(allocated.context.restored_from_storage());
        assert_eq!(allocated.context.config().device_name, "hall-rabbit");

        let _ = std::fs::remove_file(&path);
    }
}
