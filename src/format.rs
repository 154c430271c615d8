//! Display strings for the tracker overlay and the ride history list.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::record::RideRecord;

/// Live timer, `m:ss` (minutes are not wrapped into hours).
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// History list duration, `Xm Ys`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Whole number with thousands separators: `12500` → `12,500`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Short ride date for the history list, e.g. `Feb 2, 09:30 AM`.
///
/// Pass the date already converted to the rider's time zone.
pub fn format_ride_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%b %-d, %I:%M %p").to_string()
}

/// Summary shown once a ride has been saved.
pub fn format_ride_summary(record: &RideRecord) -> String {
    format!(
        "Distance: {:.2} mi\nMax Speed: {:.1} mph\nVertical: {} ft",
        record.distance_miles, record.max_speed_mph, record.vertical_drop_feet
    )
}
