//! Recurrence codec: translation between form-level schedule descriptions
//! and the restricted cron dialect consumed by the task runner.
//!
//! Two wire shapes exist: five-field `minute hour * * days` expressions
//! for "at this time on these weekdays", and `@every <N><unit>` for fixed
//! intervals. Encoding and explanation are total functions with no error
//! channel; only the strict decoder ([`RecurrenceSpec::from_str`]) can
//! reject input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by the strict decoder.
///
/// The encode/explain surface never returns these; malformed display input
/// is echoed back instead (see [`explain`]).
#[derive(Debug, Error)]
pub enum RecurrenceError {
    /// Wrong number of whitespace-separated fields.
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),

    /// Minute field is not an integer in 0-59.
    #[error("invalid minute field: {0}")]
    InvalidMinute(String),

    /// Hour field is not an integer in 0-23.
    #[error("invalid hour field: {0}")]
    InvalidHour(String),

    /// Day field is not `*` or a comma-separated list of 0-6.
    #[error("invalid day field: {0}")]
    InvalidDay(String),

    /// Day-of-month or month field carries anything other than `*`.
    #[error("unsupported field value: {0}")]
    UnsupportedField(String),

    /// Malformed `@every` body.
    #[error("invalid interval expression: {0}")]
    InvalidInterval(String),

    /// Time of day outside 00:00-23:59.
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
}

/// A time of day as entered in the schedule form.
///
/// Carries no range validation of its own: the encoder passes hour and
/// minute through verbatim, and out-of-range values are rejected only by
/// the strict decoder or by the backend at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Hour, 0-23 for well-formed input.
    pub hour: u8,
    /// Minute, 0-59 for well-formed input.
    pub minute: u8,
}

impl TimeOfDay {
    /// Create a time of day from raw hour and minute values.
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = RecurrenceError;

    /// Parse an `HH:MM` string, validating the 0-23 / 0-59 ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurrenceError::InvalidTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;

        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(Self { hour, minute })
    }
}

/// Interval unit for `@every` expressions, serialized as its wire symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalUnit {
    /// Minutes.
    #[serde(rename = "m")]
    Minutes,
    /// Hours.
    #[serde(rename = "h")]
    Hours,
}

impl IntervalUnit {
    /// The single-character wire symbol for this unit.
    pub fn symbol(self) -> char {
        match self {
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
        }
    }

    /// Map a wire symbol back to a unit.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'm' => Some(IntervalUnit::Minutes),
            'h' => Some(IntervalUnit::Hours),
            _ => None,
        }
    }

    /// The display word used by [`explain`].
    ///
    /// Pluralization is a fixed word choice ("1" still renders as
    /// "minute(s)").
    pub fn label(self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "minute(s)",
            IntervalUnit::Hours => "hour(s)",
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Self::from_symbol), chars.next()) {
            (Some(unit), None) => Ok(unit),
            _ => Err(RecurrenceError::InvalidInterval(s.to_string())),
        }
    }
}

/// A cron expression in the restricted dialect, opaque and immutable once
/// produced.
///
/// Construction performs no validation; persisted expressions may carry
/// anything. Validation happens in the strict decoder and in
/// [`Schedule`](crate::core::schedule::Schedule).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronExpression(String);

impl CronExpression {
    /// Wrap a raw expression string.
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    /// The raw expression string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strictly decode this expression into a structured spec.
    pub fn decode(&self) -> Result<RecurrenceSpec, RecurrenceError> {
        self.0.parse()
    }

    /// Best-effort human-readable explanation of this expression.
    pub fn explain(&self) -> String {
        explain(&self.0)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CronExpression {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CronExpression {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<CronExpression> for String {
    fn from(expression: CronExpression) -> Self {
        expression.0
    }
}

/// A structured, form-level description of when a scheduled action runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecurrenceSpec {
    /// Run at a time of day, on each of a set of weekdays (0 = Sunday).
    ///
    /// An empty day set means every day, not never; the encoder renders it
    /// as the `*` wildcard.
    Weekly {
        /// Time of day the action runs.
        time: TimeOfDay,
        /// Weekday numbers, 0 = Sunday through 6 = Saturday.
        days: BTreeSet<u8>,
    },

    /// Run every N minutes or hours, from a reference point owned by the
    /// backend task runner.
    Interval {
        /// Interval magnitude, positive.
        every: u32,
        /// Minutes or hours.
        unit: IntervalUnit,
    },
}

impl RecurrenceSpec {
    /// Encode this spec into its cron wire form.
    pub fn to_cron(&self) -> CronExpression {
        match self {
            RecurrenceSpec::Weekly { time, days } => {
                let days: Vec<u8> = days.iter().copied().collect();
                encode_weekly(*time, &days)
            }
            RecurrenceSpec::Interval { every, unit } => encode_interval(*every, *unit),
        }
    }
}

impl FromStr for RecurrenceSpec {
    type Err = RecurrenceError;

    /// Strictly decode a cron expression in the restricted dialect.
    ///
    /// Unlike [`explain`], malformed input is rejected with a typed error,
    /// making the result safe to pre-populate an edit form with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.starts_with('@') {
            return decode_interval(trimmed);
        }

        decode_weekly(trimmed)
    }
}

/// Encode a weekly recurrence as `"<minute> <hour> * * <days-or-*>"`.
///
/// Days are sorted ascending and de-duplicated, so the output is stable
/// for any input multiset. An empty day collection encodes to the `*`
/// wildcard, which the backend interprets as every day; callers must not
/// rely on it to mean "never". Hour and minute are passed through
/// verbatim without range validation.
pub fn encode_weekly(time: TimeOfDay, days: &[u8]) -> CronExpression {
    let days: BTreeSet<u8> = days.iter().copied().collect();

    let day_field = if days.is_empty() {
        "*".to_string()
    } else {
        days.iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };

    CronExpression(format!("{} {} * * {}", time.minute, time.hour, day_field))
}

/// Encode an interval recurrence as `"@every <N><unit>"`.
///
/// A total function of its inputs; no validation is performed and zero is
/// passed through (the backend rejects it at submission time).
pub fn encode_interval(every: u32, unit: IntervalUnit) -> CronExpression {
    CronExpression(format!("@every {}{}", every, unit.symbol()))
}

/// Best-effort human-readable explanation of an arbitrary cron string.
///
/// Recognizes the two shapes this codec produces; anything else is echoed
/// back unchanged. This never fails and must not be relied on to detect
/// malformed schedules; use the strict decoder for that.
pub fn explain(expression: &str) -> String {
    if expression.starts_with("@every") {
        if let Some((value, unit)) = match_every(expression) {
            return format!("Every {} {}", value, unit.label());
        }
        return expression.to_string();
    }

    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() == 5 {
        // Fields 3 and 4 (day-of-month, month) are never interpreted.
        let minute = fields[0];
        let hour = fields[1];
        let days = if fields[4] == "*" { "All" } else { fields[4] };
        return format!("At {:0>2}:{:0>2} on days: {}", hour, minute, days);
    }

    expression.to_string()
}

/// Match `@every <digits><m|h>`, returning the digit run verbatim.
///
/// Trailing characters after the unit are tolerated, mirroring the
/// unanchored pattern match the panel has always used.
fn match_every(expression: &str) -> Option<(&str, IntervalUnit)> {
    let body = expression.strip_prefix("@every ")?;

    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    if digits_end == 0 {
        return None;
    }

    let unit = IntervalUnit::from_symbol(body[digits_end..].chars().next()?)?;
    Some((&body[..digits_end], unit))
}

/// Strictly decode an `@every` expression.
fn decode_interval(expression: &str) -> Result<RecurrenceSpec, RecurrenceError> {
    let invalid = || RecurrenceError::InvalidInterval(expression.to_string());

    let body = expression.strip_prefix("@every ").ok_or_else(invalid)?;

    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    if digits_end == 0 {
        return Err(invalid());
    }

    let every: u32 = body[..digits_end].parse().map_err(|_| invalid())?;
    if every == 0 {
        return Err(invalid());
    }

    let unit: IntervalUnit = body[digits_end..].parse().map_err(|_| invalid())?;

    Ok(RecurrenceSpec::Interval { every, unit })
}

/// Strictly decode a five-field weekly expression.
fn decode_weekly(expression: &str) -> Result<RecurrenceSpec, RecurrenceError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(RecurrenceError::FieldCount(fields.len()));
    }

    let minute: u8 = fields[0]
        .parse()
        .ok()
        .filter(|m| *m <= 59)
        .ok_or_else(|| RecurrenceError::InvalidMinute(fields[0].to_string()))?;

    let hour: u8 = fields[1]
        .parse()
        .ok()
        .filter(|h| *h <= 23)
        .ok_or_else(|| RecurrenceError::InvalidHour(fields[1].to_string()))?;

    // The dialect never uses day-of-month or month.
    for field in [fields[2], fields[3]] {
        if field != "*" {
            return Err(RecurrenceError::UnsupportedField(field.to_string()));
        }
    }

    let days = if fields[4] == "*" {
        BTreeSet::new()
    } else {
        fields[4]
            .split(',')
            .map(|day| {
                day.parse::<u8>()
                    .ok()
                    .filter(|d| *d <= 6)
                    .ok_or_else(|| RecurrenceError::InvalidDay(fields[4].to_string()))
            })
            .collect::<Result<BTreeSet<u8>, _>>()?
    };

    Ok(RecurrenceSpec::Weekly {
        time: TimeOfDay::new(hour, minute),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_weekly_sorts_and_dedups_days() {
        let cron = encode_weekly(TimeOfDay::new(14, 5), &[2, 0, 2, 5]);
        assert_eq!(cron.as_str(), "5 14 * * 0,2,5");
    }

    #[test]
    fn test_encode_weekly_is_stable_across_input_order() {
        let a = encode_weekly(TimeOfDay::new(8, 30), &[5, 3, 1]);
        let b = encode_weekly(TimeOfDay::new(8, 30), &[1, 5, 3, 3, 1]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_weekly_empty_days_becomes_wildcard() {
        let cron = encode_weekly(TimeOfDay::new(9, 0), &[]);
        assert_eq!(cron.as_str(), "0 9 * * *");
    }

    #[test]
    fn test_encode_weekly_passes_out_of_range_time_through() {
        // Range enforcement belongs to the caller and the backend.
        let cron = encode_weekly(TimeOfDay::new(99, 99), &[1]);
        assert_eq!(cron.as_str(), "99 99 * * 1");
    }

    #[test]
    fn test_encode_interval_minutes() {
        assert_eq!(
            encode_interval(30, IntervalUnit::Minutes).as_str(),
            "@every 30m"
        );
    }

    #[test]
    fn test_encode_interval_hours() {
        assert_eq!(encode_interval(2, IntervalUnit::Hours).as_str(), "@every 2h");
    }

    #[test]
    fn test_explain_interval_roundtrip() {
        let cron = encode_interval(30, IntervalUnit::Minutes);
        assert_eq!(explain(cron.as_str()), "Every 30 minute(s)");
    }

    #[test]
    fn test_explain_interval_fixed_pluralization() {
        assert_eq!(explain("@every 1h"), "Every 1 hour(s)");
    }

    #[test]
    fn test_explain_weekly_roundtrip() {
        let cron = encode_weekly(TimeOfDay::new(14, 5), &[1, 3, 5]);
        assert_eq!(explain(cron.as_str()), "At 14:05 on days: 1,3,5");
    }

    #[test]
    fn test_explain_weekly_wildcard_renders_all() {
        let cron = encode_weekly(TimeOfDay::new(9, 0), &[]);
        assert_eq!(explain(cron.as_str()), "At 09:00 on days: All");
    }

    #[test]
    fn test_explain_zero_pads_hour_and_minute() {
        assert_eq!(explain("5 9 * * *"), "At 09:05 on days: All");
    }

    #[test]
    fn test_explain_renders_out_of_range_fields_verbatim() {
        assert_eq!(explain("99 99 * * 9"), "At 99:99 on days: 9");
    }

    #[test]
    fn test_explain_echoes_unrecognized_input() {
        assert_eq!(explain("not-a-cron-string"), "not-a-cron-string");
    }

    #[test]
    fn test_explain_echoes_malformed_every_body() {
        assert_eq!(explain("@every abc"), "@every abc");
    }

    #[test]
    fn test_explain_echoes_wrong_field_count() {
        assert_eq!(explain("0 0 * *"), "0 0 * *");
        assert_eq!(explain("0 0 * * * *"), "0 0 * * * *");
    }

    #[test]
    fn test_explain_is_idempotent_on_unparseable_input() {
        for s in ["not-a-cron-string", "@every abc", "0 0 * *", ""] {
            assert_eq!(explain(&explain(s)), explain(s));
        }
    }

    #[test]
    fn test_explain_tolerates_trailing_characters_after_unit() {
        // The panel's pattern match was never end-anchored.
        assert_eq!(explain("@every 15mm"), "Every 15 minute(s)");
    }

    #[test]
    fn test_decode_weekly() {
        let spec: RecurrenceSpec = "5 14 * * 1,3,5".parse().unwrap();
        assert_eq!(
            spec,
            RecurrenceSpec::Weekly {
                time: TimeOfDay::new(14, 5),
                days: [1, 3, 5].into_iter().collect(),
            }
        );
    }

    #[test]
    fn test_decode_weekly_wildcard_days_is_empty_set() {
        let spec: RecurrenceSpec = "0 9 * * *".parse().unwrap();
        match spec {
            RecurrenceSpec::Weekly { days, .. } => assert!(days.is_empty()),
            other => panic!("expected Weekly, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_interval() {
        let spec: RecurrenceSpec = "@every 30m".parse().unwrap();
        assert_eq!(
            spec,
            RecurrenceSpec::Interval {
                every: 30,
                unit: IntervalUnit::Minutes,
            }
        );
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        let err = "0 0 * *".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::FieldCount(4)));
    }

    #[test]
    fn test_decode_rejects_out_of_range_minute() {
        let err = "60 9 * * *".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidMinute(_)));
    }

    #[test]
    fn test_decode_rejects_out_of_range_hour() {
        let err = "0 24 * * *".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidHour(_)));
    }

    #[test]
    fn test_decode_rejects_out_of_range_day() {
        let err = "0 9 * * 7".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidDay(_)));
    }

    #[test]
    fn test_decode_rejects_day_of_month_and_month_values() {
        let err = "0 9 1 * *".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::UnsupportedField(_)));
    }

    #[test]
    fn test_decode_rejects_zero_interval() {
        let err = "@every 0m".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidInterval(_)));
    }

    #[test]
    fn test_decode_rejects_malformed_every_body() {
        for s in ["@every abc", "@every m", "@every 5", "@every 5d", "@every 5mm"] {
            let err = s.parse::<RecurrenceSpec>().unwrap_err();
            assert!(matches!(err, RecurrenceError::InvalidInterval(_)), "{}", s);
        }
    }

    #[test]
    fn test_decode_encode_normalizes_day_order() {
        let spec: RecurrenceSpec = "5 14 * * 5,1,3,3".parse().unwrap();
        assert_eq!(spec.to_cron().as_str(), "5 14 * * 1,3,5");
    }

    #[test]
    fn test_spec_encode_decode_roundtrip() {
        let spec = RecurrenceSpec::Weekly {
            time: TimeOfDay::new(4, 30),
            days: [0, 6].into_iter().collect(),
        };
        assert_eq!(spec.to_cron().decode().unwrap(), spec);

        let spec = RecurrenceSpec::Interval {
            every: 12,
            unit: IntervalUnit::Hours,
        };
        assert_eq!(spec.to_cron().decode().unwrap(), spec);
    }

    #[test]
    fn test_time_of_day_parse() {
        let time: TimeOfDay = "14:05".parse().unwrap();
        assert_eq!(time, TimeOfDay::new(14, 5));
        assert_eq!(time.to_string(), "14:05");
    }

    #[test]
    fn test_time_of_day_parse_rejects_out_of_range() {
        for s in ["24:00", "12:60", "12", "ab:cd", ""] {
            assert!(s.parse::<TimeOfDay>().is_err(), "{}", s);
        }
    }

    proptest! {
        #[test]
        fn prop_encoded_days_are_ascending_and_deduped(
            days in proptest::collection::vec(0u8..=6, 1..20),
        ) {
            let cron = encode_weekly(TimeOfDay::new(12, 0), &days);
            let field = cron.as_str().split_whitespace().nth(4).unwrap().to_string();

            let parsed: Vec<u8> = field.split(',').map(|d| d.parse().unwrap()).collect();
            let expected: Vec<u8> = days
                .iter()
                .copied()
                .collect::<BTreeSet<u8>>()
                .into_iter()
                .collect();

            prop_assert_eq!(parsed, expected);
        }

        #[test]
        fn prop_decode_recovers_encoded_weekly(
            hour in 0u8..=23,
            minute in 0u8..=59,
            days in proptest::collection::btree_set(0u8..=6, 0..7),
        ) {
            let day_vec: Vec<u8> = days.iter().copied().collect();
            let cron = encode_weekly(TimeOfDay::new(hour, minute), &day_vec);
            let spec = cron.decode().unwrap();

            prop_assert_eq!(
                spec,
                RecurrenceSpec::Weekly { time: TimeOfDay::new(hour, minute), days }
            );
        }

        #[test]
        fn prop_explain_never_panics(s in "\\PC*") {
            let _ = explain(&s);
        }
    }
}
