//! Cron normalization, parsing and next-fire helpers.

use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use cron::Schedule;

use teamboard_core::ConfigError;

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Configuration uses standard 5-field cron: `min hour day-of-month month day-of-week`.
pub fn normalize_cron(expr: &str) -> String {
    let trimmed = expr.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {}", trimmed)
    } else {
        // Already 6-field or non-standard; let the parser decide.
        trimmed.to_string()
    }
}

/// Parse a 5- or 6-field cron expression.
pub fn parse_schedule(expr: &str) -> Result<Schedule, ConfigError> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| ConfigError::InvalidCron {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

/// First scheduled tick strictly after `after`.
pub fn next_fire<Tz: TimeZone>(schedule: &Schedule, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    schedule.after(after).next()
}
