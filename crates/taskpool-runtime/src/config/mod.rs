//! Pool configuration.
//!
//! This runtime has no scheduler, no preemption, and no per-task
//! priority, so there is nothing to configure beyond how many workers to
//! start and whether to turn on debug logging.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Environment variables (runtime)
//! 2. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use taskpool_runtime::config::PoolConfig;
//!
//! let config = PoolConfig::from_env();
//! let config = PoolConfig::from_env().num_workers(8);
//! ```

use taskpool_core::env::env_get;

/// Default worker count when `TASKPOOL_WORKERS` is unset.
pub const DEFAULT_NUM_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads to start.
    pub num_workers: usize,
    /// Enable debug logging via `taskpool_core::kprint`.
    pub debug_logging: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Build a config from compile-time defaults with environment
    /// variable overrides.
    ///
    /// - `TASKPOOL_WORKERS` - number of worker threads
    /// - `TASKPOOL_DEBUG` - enable debug logging (0/1)
    pub fn from_env() -> Self {
        Self {
            num_workers: env_get("TASKPOOL_WORKERS", DEFAULT_NUM_WORKERS),
            debug_logging: env_get("TASKPOOL_DEBUG", 0usize) != 0,
        }
    }

    /// Build a config with library defaults, ignoring the environment.
    pub fn new() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            debug_logging: false,
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // num_workers == 0 is a valid, if degenerate, configuration: the
        // resulting pool spawns no workers and drains immediately on
        // destroy (spec boundary case), so it is not rejected here.
        if self.num_workers > taskpool_core::constants::MAX_WORKERS_PER_POOL {
            return Err(ConfigError::InvalidValue("num_workers exceeds MAX_WORKERS_PER_POOL"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_has_sane_defaults() {
        let config = PoolConfig::from_env();
        assert!(config.num_workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = PoolConfig::new().num_workers(8).debug_logging(true);
        assert_eq!(config.num_workers, 8);
        assert!(config.debug_logging);
    }

    #[test]
    fn zero_workers_is_a_valid_degenerate_config() {
        let config = PoolConfig::new().num_workers(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn excessive_workers_fails_validation() {
        let config = PoolConfig::new().num_workers(taskpool_core::constants::MAX_WORKERS_PER_POOL + 1);
        assert!(config.validate().is_err());
    }
}
