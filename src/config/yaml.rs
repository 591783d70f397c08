//! YAML task-file parsing and resolution.

use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::types::TaskFileConfig;
use crate::core::task::ScheduledTask;
use crate::core::types::ServerId;

/// Parse a task file from a YAML string.
pub fn parse_tasks(input: &str) -> Result<TaskFileConfig, ConfigError> {
    Ok(serde_yaml::from_str(input)?)
}

/// Load a task file from disk.
pub fn load_tasks_from_file(path: impl AsRef<Path>) -> Result<TaskFileConfig, ConfigError> {
    let path = path.as_ref();

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::YamlFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve task definitions into scheduled-task records.
///
/// Each definition's schedule is encoded through the codec; the first
/// invalid schedule aborts with the offending task's name.
pub fn resolve_tasks(config: &TaskFileConfig) -> Result<Vec<ScheduledTask>, ConfigError> {
    config
        .tasks
        .iter()
        .map(|task| {
            let cron = task
                .schedule
                .to_cron()
                .map_err(|source| ConfigError::InvalidSchedule {
                    task: task.name.clone(),
                    source,
                })?;

            Ok(ScheduledTask::new(
                ServerId::new(task.server.clone()),
                task.name.clone(),
                task.action,
                cron,
            )
            .with_payload(task.payload.clone())
            .with_one_shot(task.one_shot))
        })
        .collect()
}
