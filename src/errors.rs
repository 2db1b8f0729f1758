// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagschedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid schedule expression '{expr}': {source}")]
    InvalidSchedule {
        expr: String,
        #[source]
        source: cron::error::Error,
    },

    #[error("Watcher error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagschedError>;
