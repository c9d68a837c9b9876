//! Host configuration.
//!
//! Sequence limits vary by device class, so they are supplied by the host
//! rather than built into the sequence. This module defines the JSON
//! configuration file the bundled CLI host reads them from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::DriverOptions;
use crate::error::ConfigError;
use crate::types::SequenceLimits;

/// Default maximum number of timers in a sequence.
fn default_max_timers() -> usize {
    20
}

/// Default number of timers per group.
fn default_group_capacity() -> usize {
    4
}

/// Default driver polling period in milliseconds.
fn default_poll_interval_ms() -> u64 {
    250
}

/// Host configuration for sequences and the tick driver.
///
/// # Example
///
/// ```
/// use cascade_timer::config::HostConfig;
///
/// let config = HostConfig::default();
/// assert_eq!(config.max_timers, 20);
/// assert_eq!(config.group_capacity, 4);
/// assert!(!config.auto_cascade);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum number of timers in a sequence.
    #[serde(default = "default_max_timers")]
    pub max_timers: usize,

    /// Maximum number of timers per group.
    #[serde(default = "default_group_capacity")]
    pub group_capacity: usize,

    /// Driver polling period in milliseconds (10-1000).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Start the next timer automatically when the current one alarms.
    #[serde(default)]
    pub auto_cascade: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_timers: default_max_timers(),
            group_capacity: default_group_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
            auto_cascade: false,
        }
    }
}

impl HostConfig {
    /// Sets whether timers cascade automatically.
    #[must_use]
    pub fn with_auto_cascade(mut self, auto_cascade: bool) -> Self {
        self.auto_cascade = auto_cascade;
        self
    }

    /// Sets the driver polling period.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits()?;
        if !(10..=1000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid(
                "poll_interval_ms は10-1000の範囲で指定してください".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the sequence limits described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a limit is zero.
    pub fn limits(&self) -> Result<SequenceLimits, ConfigError> {
        SequenceLimits::new(self.max_timers, self.group_capacity)
    }

    /// Returns the driver options described by this configuration.
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            poll_interval: std::time::Duration::from_millis(self.poll_interval_ms),
            auto_cascade: self.auto_cascade,
        }
    }

    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cascade-timer").join("config.json"))
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(?path, "configuration loaded");
        Ok(config)
    }

    /// Loads a configuration file, falling back to defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(?path, "configuration not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
