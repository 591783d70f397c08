//! Scheduled task model.
//!
//! A [`ScheduledTask`] is the persisted record the backend task runner
//! executes from: which server, which action, and the cron expression
//! produced by the recurrence codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::recurrence::CronExpression;
use crate::core::schedule::{Schedule, ScheduleError};
use crate::core::types::{ServerId, TaskId};

/// Action the task runner performs against a server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    /// Start the server process.
    Start,
    /// Stop the server process.
    Stop,
    /// Stop, then start again.
    Restart,
    /// Send console command(s) from the payload.
    Command,
}

/// A recurring automated action against a server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique task identifier.
    pub id: TaskId,
    /// Server instance this task acts on.
    pub server_id: ServerId,
    /// Human-readable task name.
    pub name: String,
    /// What the task runner does when the task fires.
    pub action: TaskAction,
    /// Console commands for [`TaskAction::Command`], one per line.
    #[serde(default)]
    pub payload: String,
    /// When the task runs, in the restricted cron dialect.
    pub cron_expression: CronExpression,
    /// Delete the task after its first execution.
    #[serde(default)]
    pub one_shot: bool,
    /// When the task runner last executed this task.
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    /// Create a new task with a fresh identifier.
    pub fn new(
        server_id: ServerId,
        name: impl Into<String>,
        action: TaskAction,
        cron_expression: CronExpression,
    ) -> Self {
        Self {
            id: TaskId::new(),
            server_id,
            name: name.into(),
            action,
            payload: String::new(),
            cron_expression,
            one_shot: false,
            last_run: None,
        }
    }

    /// Set the command payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set the one-shot flag.
    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    /// Build a validated schedule from this task's expression.
    pub fn schedule(&self) -> Result<Schedule, ScheduleError> {
        Schedule::new(self.cron_expression.as_str())
    }

    /// Next run time after the given anchor, for display.
    pub fn next_run(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        self.schedule()?.next_after(after)
    }

    /// Human-readable description of this task's recurrence.
    pub fn describe(&self) -> String {
        self.cron_expression.explain()
    }
}
