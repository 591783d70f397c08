//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::recurrence::RecurrenceError;

/// Errors that can occur when loading a task file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a task file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Failed to parse YAML from a specific file.
    #[error("YAML parse error in '{path}': {source}")]
    YamlFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A task's schedule could not be resolved to a cron expression.
    #[error("invalid schedule for task '{task}': {source}")]
    InvalidSchedule {
        task: String,
        #[source]
        source: RecurrenceError,
    },
}
