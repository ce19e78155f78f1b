//! # Workload Arithmetic
//!
//! Weekly hours are entered in quarter-hour increments between 15 minutes
//! and 40 hours. The number of weeks is counted in whole calendar weeks
//! from the relation's start date to the end of the certificate period, and
//! the total is their product.

use cs_core::Timestamp;

use crate::request::ValidationError;

/// Smallest accepted weekly workload in hours.
pub const MIN_HOURS_PER_WEEK: f64 = 0.25;

/// Largest accepted weekly workload in hours.
pub const MAX_HOURS_PER_WEEK: f64 = 40.0;

/// Granularity of the weekly workload in hours.
pub const HOURS_STEP: f64 = 0.25;

/// Whether `hours` is a quarter-hour multiple within the accepted range.
pub fn is_workload_allowed(hours: f64) -> bool {
    hours.is_finite()
        && hours % HOURS_STEP == 0.0
        && (MIN_HOURS_PER_WEEK..=MAX_HOURS_PER_WEEK).contains(&hours)
}

/// [`is_workload_allowed`] as a validation result.
pub fn validate_workload(hours: f64) -> Result<(), ValidationError> {
    if is_workload_allowed(hours) {
        Ok(())
    } else {
        Err(ValidationError::WorkloadNotAllowed { hours })
    }
}

/// Whole weeks from the calendar date of `start` to that of `end`.
///
/// Partial weeks are truncated. An end before the start yields 0.
pub fn weeks_between(start: Timestamp, end: Timestamp) -> u32 {
    let days = (end.date() - start.date()).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / 7).unwrap_or(u32::MAX)
}

/// Total hours for a weekly workload sustained over `weeks`.
pub fn total_hours(hours_per_week: f64, weeks: u32) -> f64 {
    hours_per_week * f64::from(weeks)
}
