//! Date utilities for daily reset hour handling.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};

/// Get the study day that `now` falls on.
///
/// If the current hour is before the reset hour, "today" is actually "yesterday"
/// from a study perspective. This lets late-night sessions count towards the
/// previous day's stats and due cards.
///
/// # Arguments
/// * `now` - Current local time
/// * `daily_reset_hour` - Hour of day (0-23) when a new study day begins
pub fn study_day<Tz: TimeZone>(now: &DateTime<Tz>, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now.clone() - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// Study day for the current local time.
pub fn study_today(daily_reset_hour: u32) -> NaiveDate {
    study_day(&chrono::Local::now(), daily_reset_hour)
}
