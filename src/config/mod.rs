//! Task-file configuration loading.
//!
//! Scheduled tasks can be declared in a YAML file and resolved into
//! [`ScheduledTask`](crate::core::task::ScheduledTask) records, with each
//! schedule expressed either as a raw cron string or in the structured
//! weekly/interval forms the panel's form layer produces.

mod error;
mod types;
mod yaml;

pub use error::ConfigError;
pub use types::{ScheduleConfig, TaskConfig, TaskFileConfig};
pub use yaml::{load_tasks_from_file, parse_tasks, resolve_tasks};
