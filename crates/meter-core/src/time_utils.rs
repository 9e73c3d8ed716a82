use chrono::{DateTime, NaiveDateTime};

use crate::error::{PipelineError, Result};

/// Wall-clock layout of a vendor `date` column joined with a time column.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render layout for a single UTC day.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Converts a vendor date plus time-of-day pair to epoch seconds.
///
/// Vendor exports carry no zone information, so wall-clock values are read
/// as UTC. Surrounding whitespace is tolerated; anything else that deviates
/// from `YYYY-MM-DD HH:MM` is an error.
pub fn wall_clock_to_epoch(date: &str, time: &str) -> Result<i64> {
    let combined = format!("{} {}", date.trim(), time.trim());
    let parsed = NaiveDateTime::parse_from_str(&combined, WALL_CLOCK_FORMAT).map_err(|err| {
        PipelineError::Timestamp {
            value: combined.clone(),
            reason: err.to_string(),
        }
    })?;
    Ok(parsed.and_utc().timestamp())
}

/// Floors an epoch timestamp to midnight UTC of its day.
pub fn day_floor(epoch: i64) -> i64 {
    epoch.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// Renders an epoch timestamp as its UTC day, for log lines.
pub fn format_day(epoch: i64) -> String {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.format(DAY_FORMAT).to_string())
        .unwrap_or_else(|| epoch.to_string())
}
