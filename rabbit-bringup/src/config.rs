//! Configuration for the bring-up orchestrator
//!
//! Defaults match the device firmware: wait for the link forever, run on a
//! task named `bring-up`, launch the `audio-test` worker.

use std::path::PathBuf;
use std::time::Duration;

use link_signal::WaitTimeout;
use thiserror::Error;

/// Environment variable holding the link timeout in milliseconds (0 = forever)
pub const ENV_LINK_TIMEOUT_MS: &str = "RABBIT_LINK_TIMEOUT_MS";

/// Environment variable holding the persisted config path
pub const ENV_CONFIG_PATH: &str = "RABBIT_CONFIG_PATH";

/// Environment variable overriding the bring-up task name
pub const ENV_TASK_NAME: &str = "RABBIT_TASK_NAME";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Missing platform service: {0}")]
    MissingService(&'static str),
}

/// Configuration for a bring-up attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BringupConfig {
    /// How long to wait for the network link
    /// Default: forever (recovery is an external reboot)
    pub link_timeout: WaitTimeout,

    /// Name of the orchestrating task's thread
    /// Default: "bring-up"
    pub task_name: String,

    /// Name of the worker launched after the link comes up
    /// Default: "audio-test"
    pub worker_name: String,

    /// File holding the persisted application config
    /// Default: none (runtime uses defaults)
    pub config_path: Option<PathBuf>,
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self {
            link_timeout: WaitTimeout::Forever,
            task_name: "bring-up".to_string(),
            worker_name: "audio-test".to_string(),
            config_path: None,
        }
    }
}

impl BringupConfig {
    /// Create a BringupConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a BringupConfig that gives up on the link after `timeout`
    pub fn bounded(timeout: Duration) -> Self {
        Self {
            link_timeout: WaitTimeout::After(timeout),
            ..Default::default()
        }
    }

    pub fn with_link_timeout(mut self, timeout: WaitTimeout) -> Self {
        self.link_timeout = timeout;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load configuration from `RABBIT_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LINK_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_LINK_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            config.link_timeout = WaitTimeout::from_millis(ms);
        }

        if let Some(path) = lookup(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            config.config_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup(ENV_TASK_NAME) {
            config.task_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Task name must not be empty".to_string(),
            ));
        }

        if self.worker_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Worker name must not be empty".to_string(),
            ));
        }

        if self.link_timeout == WaitTimeout::After(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "Link timeout must be greater than 0 (use Forever to wait indefinitely)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_wait_forever() {
        let config = BringupConfig::default();
        assert!(config.link_timeout.is_forever());
        assert_eq!(config.task_name, "bring-up");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = BringupConfig::from_lookup(lookup_from(&[
            (ENV_LINK_TIMEOUT_MS, "1500"),
            (ENV_CONFIG_PATH, "/data/app.json"),
        ]))
        .unwrap();

        assert_eq!(
            config.link_timeout,
            WaitTimeout::After(Duration::from_millis(1500))
        );
        assert_eq!(config.config_path, Some(PathBuf::from("/data/app.json")));
    }

    #[test]
    fn test_zero_timeout_env_means_forever() {
        let config =
            BringupConfig::from_lookup(lookup_from(&[(ENV_LINK_TIMEOUT_MS, "0")])).unwrap();
        assert_eq!(config.link_timeout, WaitTimeout::Forever);
    }

    #[test]
    fn test_invalid_env_value() {
        let err = BringupConfig::from_lookup(lookup_from(&[(ENV_LINK_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: ENV_LINK_TIMEOUT_MS,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_empty_task_name() {
        let config = BringupConfig {
            task_name: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BringupConfig::bounded(Duration::ZERO).validate().is_err());
    }
}
