// packages/engine/src/utils/config.rs
//! Engine configuration
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. Built-in defaults (see the `Default` impls below)
//! 2. An optional `swarmlab.{toml,yaml,json}` file in the working directory
//! 3. Environment variables prefixed with `SWARMLAB_`, nested keys joined by `__`
//!
//! ```text
//! SWARMLAB_RUNTIME__MAX_CONCURRENT_AGENTS=8
//! SWARMLAB_RUNTIME__ROUND_TIMEOUT_MS=2500
//! SWARMLAB_OBSERVABILITY__JSON_LOGS=true
//! ```

use crate::utils::errors::{EngineError, Result};
use ::config::{Config, Environment as EnvSource, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default bound on agents executing at the same time
pub const DEFAULT_MAX_CONCURRENT_AGENTS: usize = 64;

/// Default capacity of the round event queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Round execution settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Round event recording
    #[serde(default)]
    pub recording: RecordingConfig,

    /// Logging and metrics
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Round execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of agent pipelines running at once (default: 64)
    pub max_concurrent_agents: usize,

    /// Round-level deadline in milliseconds (default: none)
    pub round_timeout_ms: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_agents: DEFAULT_MAX_CONCURRENT_AGENTS,
            round_timeout_ms: None,
        }
    }
}

impl RuntimeConfig {
    /// Round deadline as a `Duration`
    pub fn round_timeout(&self) -> Option<Duration> {
        self.round_timeout_ms.map(Duration::from_millis)
    }

    /// Reject values the worker pool cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_agents == 0 {
            return Err(EngineError::InvalidArgument(
                "max_concurrent_agents cannot be 0".to_string(),
            ));
        }

        if self.round_timeout_ms == Some(0) {
            return Err(EngineError::InvalidArgument(
                "round_timeout_ms cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Round event recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Attach a recorder to the environment (default: false)
    pub enabled: bool,

    /// Bounded queue size; events beyond it are dropped and counted
    pub queue_capacity: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Logging and metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Install the Prometheus metrics recorder
    pub metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics: true,
        }
    }
}

impl EngineConfig {
    /// Load from `swarmlab.*` (optional) and `SWARMLAB_*` environment variables
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("swarmlab").required(false))
            .add_source(Self::env_source())
            .build()?;

        Self::finish(settings)
    }

    /// Load from an explicit file; environment variables still take precedence
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Self::env_source())
            .build()?;

        Self::finish(settings)
    }

    fn env_source() -> EnvSource {
        EnvSource::with_prefix("SWARMLAB")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn finish(settings: Config) -> Result<Self> {
        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.runtime.validate()?;

        if self.recording.queue_capacity == 0 {
            return Err(EngineError::InvalidArgument(
                "recording.queue_capacity cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;

    // Tests reading SWARMLAB_* variables must not overlap
    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    /// Sets environment variables, removing them again on drop
    struct EnvVars(Vec<&'static str>);

    impl EnvVars {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for EnvVars {
        fn drop(&mut self) {
            for key in &self.0 {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.runtime.max_concurrent_agents, 64);
        assert!(config.runtime.round_timeout().is_none());
        assert!(!config.recording.enabled);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let zero_pool = RuntimeConfig {
            max_concurrent_agents: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_pool.validate(),
            Err(EngineError::InvalidArgument(_))
        ));

        let zero_timeout = RuntimeConfig {
            round_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let mut config = EngineConfig::default();
        config.recording.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let _lock = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[runtime]\nmax_concurrent_agents = 4\nround_timeout_ms = 250\n\n[recording]\nenabled = true"
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.runtime.max_concurrent_agents, 4);
        assert_eq!(
            config.runtime.round_timeout(),
            Some(Duration::from_millis(250))
        );
        assert!(config.recording.enabled);
        assert_eq!(config.recording.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_from_file_rejects_malformed_values() {
        let _lock = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[runtime]\nmax_concurrent_agents = 0").unwrap();

        let result = EngineConfig::from_file(file.path());
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let _lock = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[runtime]\nmax_concurrent_agents = 4\nround_timeout_ms = 250").unwrap();

        let _vars = EnvVars::set(&[
            ("SWARMLAB_RUNTIME__ROUND_TIMEOUT_MS", "900"),
            ("SWARMLAB_RECORDING__ENABLED", "true"),
        ]);

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.runtime.round_timeout_ms, Some(900));
        assert_eq!(config.runtime.max_concurrent_agents, 4);
        assert!(config.recording.enabled);
    }

    #[test]
    fn test_load_reads_environment() {
        let _lock = ENV_LOCK.lock();
        let _vars = EnvVars::set(&[
            ("SWARMLAB_RUNTIME__MAX_CONCURRENT_AGENTS", "8"),
            ("SWARMLAB_OBSERVABILITY__JSON_LOGS", "true"),
        ]);

        let config = EngineConfig::load().unwrap();
        assert_eq!(config.runtime.max_concurrent_agents, 8);
        assert!(config.observability.json_logs);
        assert_eq!(config.recording, RecordingConfig::default());
    }

    #[test]
    fn test_invalid_environment_value_rejected() {
        let _lock = ENV_LOCK.lock();
        let _vars = EnvVars::set(&[("SWARMLAB_RUNTIME__MAX_CONCURRENT_AGENTS", "0")]);

        assert!(matches!(
            EngineConfig::load(),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
