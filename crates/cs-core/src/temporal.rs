//! # Temporal Types: UTC Timestamps and Clocks
//!
//! Defines `Timestamp`, a UTC-only instant truncated to seconds precision,
//! and the `Clock` trait through which the wizard reads "now".
//!
//! The remote API exchanges period end dates as Unix seconds and relation
//! start dates as Unix milliseconds, so both epoch conversions live here.
//! Week arithmetic works on calendar dates (`date()`), never on raw
//! second differences.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Midnight UTC at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Parse an RFC 3339 string (any offset) or a bare `YYYY-MM-DD` date.
    ///
    /// Offsets are converted to UTC; bare dates resolve to midnight UTC.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("epoch seconds {secs}")))
    }

    /// Create a timestamp from Unix epoch milliseconds, dropping sub-seconds.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, CoreError> {
        DateTime::from_timestamp_millis(millis)
            .map(|dt| Self(truncate_to_seconds(dt)))
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("epoch millis {millis}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Unix epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The UTC calendar date of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// This instant shifted forward by whole days, saturating at the
    /// representable maximum.
    pub fn plus_days(&self, days: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(days)).unwrap_or(self.0))
    }

    /// This instant shifted backward by whole days, saturating at the
    /// representable minimum.
    pub fn minus_days(&self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(self.0))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Clock ───────────────────────────────────────────────────────────

/// Source of "now" for the wizard.
///
/// Passed in explicitly through the wizard context so tests can pin time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
