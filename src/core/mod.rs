//! Core scheduling domain: the recurrence codec, schedule evaluation, and
//! the scheduled-task model.

pub mod recurrence;
pub mod schedule;
pub mod task;
pub mod types;
