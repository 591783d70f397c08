//! Schedule evaluation and next-occurrence calculation.
//!
//! Builds on the strict decoder to compute upcoming run times for display
//! ("next run" on the task list). Only the panel's restricted dialect is
//! evaluated; authoritative scheduling stays with the backend task runner.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::core::recurrence::{CronExpression, IntervalUnit, RecurrenceError, RecurrenceSpec};

/// Errors that can occur when building or evaluating schedules.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Expression rejected by the strict decoder.
    #[error("invalid cron expression: {0}")]
    InvalidCron(#[from] RecurrenceError),

    /// Unknown IANA timezone name.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// No occurrence could be found after the anchor.
    #[error("no matching occurrence")]
    NoMatchingOccurrence,
}

/// A validated schedule over the restricted cron dialect.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// The original expression string.
    expression: CronExpression,
    /// IANA timezone name for weekly schedules.
    timezone: String,
    /// Parsed timezone.
    tz: Tz,
    /// Decoded recurrence.
    spec: RecurrenceSpec,
}

impl Schedule {
    /// Create a schedule from a cron expression, evaluated in UTC.
    pub fn new(expression: impl Into<String>) -> Result<Self, ScheduleError> {
        Self::with_timezone(expression, "UTC")
    }

    /// Create a schedule evaluated in a specific timezone.
    ///
    /// The timezone only affects weekly schedules; interval schedules are
    /// plain duration arithmetic from the anchor.
    pub fn with_timezone(
        expression: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let expression = expression.into();
        let timezone = timezone.into();

        let tz: Tz = timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(timezone.clone()))?;

        let spec: RecurrenceSpec = expression.parse()?;

        Ok(Self {
            expression: CronExpression::new(expression),
            timezone,
            tz,
            spec,
        })
    }

    /// Create a schedule from a structured spec, evaluated in UTC.
    ///
    /// The spec is encoded and re-decoded, so the validation path is the
    /// same as for persisted expressions.
    pub fn from_spec(spec: &RecurrenceSpec) -> Result<Self, ScheduleError> {
        Self::new(spec.to_cron())
    }

    /// Get the next occurrence strictly after the given time.
    ///
    /// For interval schedules the anchor is the caller-supplied reference
    /// point; the backend owns the implicit one it actually runs from.
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        match &self.spec {
            RecurrenceSpec::Interval { every, unit } => {
                let step = match unit {
                    IntervalUnit::Minutes => Duration::minutes(i64::from(*every)),
                    IntervalUnit::Hours => Duration::hours(i64::from(*every)),
                };
                Ok(after + step)
            }
            RecurrenceSpec::Weekly { time, days } => {
                let local_time = NaiveTime::from_hms_opt(
                    u32::from(time.hour),
                    u32::from(time.minute),
                    0,
                )
                .ok_or_else(|| {
                    ScheduleError::InvalidCron(RecurrenceError::InvalidTime(time.to_string()))
                })?;

                let local_after = after.with_timezone(&self.tz);

                // An empty day set means every day. Scanning eight days
                // covers a full week plus the case where today's time has
                // already passed.
                for offset in 0..=7 {
                    let date = local_after.date_naive() + Duration::days(offset);

                    let weekday = date.weekday().num_days_from_sunday() as u8;
                    if !days.is_empty() && !days.contains(&weekday) {
                        continue;
                    }

                    // Skip local times that don't exist (DST gap).
                    let candidate = match self.tz.from_local_datetime(&date.and_time(local_time)).earliest() {
                        Some(dt) => dt.with_timezone(&Utc),
                        None => continue,
                    };

                    if candidate > after {
                        return Ok(candidate);
                    }
                }

                Err(ScheduleError::NoMatchingOccurrence)
            }
        }
    }

    /// Get the next occurrence from now.
    pub fn next(&self) -> Result<DateTime<Utc>, ScheduleError> {
        self.next_after(Utc::now())
    }

    /// Get the next N occurrences after the given time.
    pub fn next_n_after(
        &self,
        after: DateTime<Utc>,
        n: usize,
    ) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
        let mut results = Vec::with_capacity(n);
        let mut current = after;
        for _ in 0..n {
            current = self.next_after(current)?;
            results.push(current);
        }
        Ok(results)
    }

    /// Get the next N occurrences from now.
    pub fn next_n(&self, n: usize) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
        self.next_n_after(Utc::now(), n)
    }

    /// Get the original expression.
    pub fn expression(&self) -> &CronExpression {
        &self.expression
    }

    /// Get the timezone name.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Get the decoded recurrence.
    pub fn spec(&self) -> &RecurrenceSpec {
        &self.spec
    }
}
