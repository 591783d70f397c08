//! Task-file type definitions.

use serde::{Deserialize, Serialize};

use crate::core::recurrence::{
    encode_interval, encode_weekly, CronExpression, IntervalUnit, RecurrenceError, RecurrenceSpec,
    TimeOfDay,
};
use crate::core::task::TaskAction;

/// A task file: a list of scheduled-task definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFileConfig {
    /// Task definitions.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// One scheduled-task definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Human-readable task name.
    pub name: String,
    /// Target server instance.
    pub server: String,
    /// Action performed when the task fires.
    pub action: TaskAction,
    /// Console commands for `command` tasks, one per line.
    #[serde(default)]
    pub payload: String,
    /// Delete the task after its first execution.
    #[serde(default)]
    pub one_shot: bool,
    /// When the task runs.
    pub schedule: ScheduleConfig,
}

/// Schedule declaration, in any of the forms the panel produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleConfig {
    /// Raw cron expression string.
    Cron(String),
    /// Weekly form: a time of day plus weekday numbers (0 = Sunday).
    Weekly {
        /// Time of day, `HH:MM`.
        at: String,
        /// Weekday numbers; empty means every day.
        #[serde(default)]
        days: Vec<u8>,
    },
    /// Interval form: every N minutes or hours.
    Interval {
        /// Interval magnitude.
        every: u32,
        /// `m` or `h`.
        unit: IntervalUnit,
    },
}

impl ScheduleConfig {
    /// Resolve this declaration to a cron expression.
    ///
    /// Raw expressions go through the strict decoder and are re-encoded,
    /// so whatever reaches the task runner is validated and in normalized
    /// form (days ascending, de-duplicated).
    pub fn to_cron(&self) -> Result<CronExpression, RecurrenceError> {
        match self {
            ScheduleConfig::Cron(raw) => Ok(raw.parse::<RecurrenceSpec>()?.to_cron()),
            ScheduleConfig::Weekly { at, days } => {
                let time: TimeOfDay = at.parse()?;
                Ok(encode_weekly(time, days))
            }
            ScheduleConfig::Interval { every, unit } => {
                if *every == 0 {
                    return Err(RecurrenceError::InvalidInterval(format!(
                        "every {}{}",
                        every,
                        unit.symbol()
                    )));
                }
                Ok(encode_interval(*every, *unit))
            }
        }
    }
}
