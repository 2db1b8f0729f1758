// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{DagschedError, Result};
use crate::head::DEFAULT_EXTENSIONS;

/// Scheduler front-end configuration.
///
/// Deserialized from TOML via [`crate::config::loader::load_from_path`], or
/// built in code with [`SchedulerConfig::new`] plus the builder-ish setters.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Directory containing workflow definition files.
    pub dags_dir: PathBuf,

    /// Recognized definition-file extensions, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Quiet window for coalescing rapid filesystem events per path.
    #[serde(default = "default_debounce_window", with = "humantime_serde")]
    pub debounce_window: Duration,

    /// Full-directory poll interval used when native file notification is
    /// unavailable.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl SchedulerConfig {
    /// Configuration with defaults for everything but the definitions directory.
    pub fn new(dags_dir: impl Into<PathBuf>) -> Self {
        Self {
            dags_dir: dags_dir.into(),
            extensions: default_extensions(),
            debounce_window: default_debounce_window(),
            poll_interval: default_poll_interval(),
        }
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Basic sanity validation, independent of the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.dags_dir.as_os_str().is_empty() {
            return Err(DagschedError::ConfigError(
                "dags_dir must not be empty".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(DagschedError::ConfigError(
                "extensions must list at least one definition-file extension".to_string(),
            ));
        }
        if self.debounce_window.is_zero() {
            return Err(DagschedError::ConfigError(
                "debounce_window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_debounce_window() -> Duration {
    Duration::from_millis(500)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}
