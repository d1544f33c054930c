//! Timestamp value generators.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Format accepted by SQL `TIMESTAMP` columns.
const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC timestamp. Not deterministic.
pub fn generate_timestamp_now() -> String {
    Utc::now().format(SQL_TIMESTAMP_FORMAT).to_string()
}

/// Generate a random timestamp in `start..=end`, at whole-second resolution.
pub fn generate_timestamp_range<R: Rng>(
    rng: &mut R,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> String {
    let start_ts = start.timestamp();
    let end_ts = end.timestamp();
    let dt = if start_ts >= end_ts {
        *start
    } else {
        let random_ts = rng.random_range(start_ts..=end_ts);
        DateTime::from_timestamp(random_ts, 0).unwrap_or(*start)
    };
    dt.format(SQL_TIMESTAMP_FORMAT).to_string()
}
