use std::time::Duration;

use chrono::{DateTime, Local, Timelike, Utc};

pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// Standard time-of-day rendering for reminders and intake updates.
pub fn format_local_time(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Shorter rendering used next to individual intake increments.
pub fn format_local_hour_minute(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%H:%M").to_string()
}

/// Time left until the next full hour on the local clock. Exactly on the hour yields a whole hour.
pub fn until_next_local_hour(moment: DateTime<Utc>) -> Duration {
    let local = moment.with_timezone(&Local);
    // A leap second shows up as nanoseconds above one second.
    let into_hour = Duration::from_secs(u64::from(local.minute() * 60 + local.second()))
        + Duration::from_nanos(u64::from(local.nanosecond() % 1_000_000_000));
    HOUR.saturating_sub(into_hour)
}
