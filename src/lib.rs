//! warden - scheduling and live-telemetry core for a game-server control
//! panel.
//!
//! The crate has four parts:
//!
//! - [`core::recurrence`]: the recurrence codec translating form-level
//!   schedule descriptions to and from the restricted cron dialect the
//!   backend task runner consumes.
//! - [`core::schedule`] and [`core::task`]: occurrence preview and the
//!   scheduled-task model built on the codec.
//! - [`telemetry`]: the tagged envelope protocol carrying console lines,
//!   status transitions, and resource samples from a running server to
//!   its observers.
//! - [`catalog`]: the process-lifetime cache over the upstream version
//!   manifest.

pub mod catalog;
pub mod config;
pub mod core;
pub mod telemetry;

#[cfg(feature = "http")]
pub use crate::catalog::HttpVersionFetcher;
pub use crate::catalog::{
    CatalogError, ReleaseChannel, VersionCatalog, VersionDescriptor, VersionFetcher,
    VersionManifest,
};
pub use crate::config::{
    load_tasks_from_file, parse_tasks, resolve_tasks, ConfigError, ScheduleConfig, TaskConfig,
    TaskFileConfig,
};
pub use crate::core::recurrence::{
    encode_interval, encode_weekly, explain, CronExpression, IntervalUnit, RecurrenceError,
    RecurrenceSpec, TimeOfDay,
};
pub use crate::core::schedule::{Schedule, ScheduleError};
pub use crate::core::task::{ScheduledTask, TaskAction};
pub use crate::core::types::{ServerId, TaskId};
pub use crate::telemetry::{Envelope, ServerStatus, StatsSample, TelemetryHub};
