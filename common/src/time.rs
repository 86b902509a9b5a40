// Every record stores its timestamps in milliseconds since the UNIX epoch.
// Durations set by the operator are given in seconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub type TimestampMillis = u64;

pub type TimestampSeconds = u64;

pub const MILLIS_PER_SECOND: u64 = 1000;

// Wall clock in milliseconds, 0 if the clock is set before the epoch
pub fn get_current_time_in_millis() -> TimestampMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis().try_into().unwrap_or(TimestampMillis::MAX))
        .unwrap_or_default()
}

#[inline]
pub const fn seconds_to_millis(seconds: TimestampSeconds) -> TimestampMillis {
    seconds.saturating_mul(MILLIS_PER_SECOND)
}
