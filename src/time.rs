//! Calendar/clock helpers. Everything is modeled in UTC: the engine has no
//! notion of the traveler's local timezone, only the caller-supplied hour
//! bounds for a given calendar date.

use chrono::{Datelike, NaiveDate, TimeZone, Timelike, Utc};

/// Unix timestamp for a given date at the start of the given hour.
/// `hour` may be 24 (meaning "midnight of the next day"), which lets
/// `dailyEndHour`'s documented range of `1..=24` be handled uniformly.
pub fn ts_at_hour(date: NaiveDate, hour: u32) -> i64 {
    ts_at_hour_minute(date, hour, 0)
}

/// Unix timestamp for a given date at the given hour and minute.
pub fn ts_at_hour_minute(date: NaiveDate, hour: u32, minute: u32) -> i64 {
    midnight_ts(date) + hour as i64 * 3600 + minute as i64 * 60
}

/// Parses a `"HH:MM"` 24h time string (`spec.md` §6 `startTime`). Returns
/// `None` if the string isn't exactly two colon-separated numeric fields
/// with `hour <= 23` and `minute <= 59`.
pub fn parse_hh_mm(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn midnight_ts(date: NaiveDate) -> i64 {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time");
    Utc.from_utc_datetime(&naive).timestamp()
}

/// The UTC calendar hour (0..24) that a unix timestamp falls in.
pub fn hour_of_day(unix_sec: i64) -> u32 {
    Utc.timestamp_opt(unix_sec, 0)
        .single()
        .map(|dt| dt.hour())
        .unwrap_or(0)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Renders a duration in minutes as `"Hh Mm"` or `"Mm"` (`spec.md` §4.6).
pub fn format_duration_minutes(total_minutes: i64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Converts seconds to whole minutes, rounding half up.
pub fn seconds_to_minutes_round_half_up(seconds: i64) -> i64 {
    (seconds + 30).div_euclid(60)
}

pub fn weekday_abbrev(date: NaiveDate) -> &'static str {
    match date.weekday() {
        chrono::Weekday::Mon => "Mon",
        chrono::Weekday::Tue => "Tue",
        chrono::Weekday::Wed => "Wed",
        chrono::Weekday::Thu => "Thu",
        chrono::Weekday::Fri => "Fri",
        chrono::Weekday::Sat => "Sat",
        chrono::Weekday::Sun => "Sun",
    }
}
