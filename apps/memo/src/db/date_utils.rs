//! Date utilities for daily reset hour handling.

use chrono::{Duration, Local, NaiveDate, Timelike};

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get adjusted "today" based on daily_reset_hour.
///
/// If the current hour is before the reset hour, "today" is actually "yesterday"
/// from a study perspective. This allows users to study late at night and have
/// it count towards the previous day.
///
/// # Arguments
/// * `daily_reset_hour` - Hour of day (0-23) when a new "study day" begins
pub fn get_adjusted_today(daily_reset_hour: u32) -> NaiveDate {
    let now = Local::now();

    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// Format a date as YYYY-MM-DD for SQL queries.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored YYYY-MM-DD date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
