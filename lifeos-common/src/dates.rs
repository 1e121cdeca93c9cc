//! Calendar helpers
//!
//! All calendar arithmetic is done in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// First date on or after `from` whose weekday is `weekday` (0 = Sunday … 6 = Saturday)
pub fn next_weekday_on_or_after(from: NaiveDate, weekday: u32) -> NaiveDate {
    let current = from.weekday().num_days_from_sunday();
    let diff = (weekday + 7 - current) % 7;
    from + Duration::days(diff as i64)
}

/// `(month, year)` pairs for the given month and the `count - 1` months before it,
/// most recent first. Months are 1-based.
pub fn trailing_months(month: u32, year: i32, count: u32) -> Vec<(u32, i32)> {
    let mut result = Vec::with_capacity(count as usize);
    let (mut m, mut y) = (month, year);
    for _ in 0..count {
        result.push((m, y));
        if m == 1 {
            m = 12;
            y -= 1;
        } else {
            m -= 1;
        }
    }
    result
}

/// Parse a wall-clock time written as `H:MM` or `HH:MM`
pub fn parse_hh_mm(value: &str) -> Option<NaiveTime> {
    let (h, m) = value.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse a date-time leniently
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, with offset or fractional seconds),
/// naive `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    parse_date(value).map(start_of_day)
}

/// Parse a calendar date, accepting a bare `YYYY-MM-DD` or the date part of a date-time
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Midnight UTC of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Combine a date and a wall-clock time into a UTC instant
pub fn at_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}
