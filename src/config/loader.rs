// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::SchedulerConfig;
use crate::errors::Result;

/// Load a configuration file from the given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: SchedulerConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` defaults).
/// - Checks global config sanity ([`SchedulerConfig::validate`]).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    let config = load_from_path(&path)?;
    config.validate()?;
    Ok(config)
}
