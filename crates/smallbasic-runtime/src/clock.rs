//! The `Clock` class.
//!
//! Every reading has a `*_of` form taking an explicit timestamp so the
//! formatting can be checked without racing the wall clock.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

/// Epoch `elapsed_milliseconds` counts from
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

pub fn time() -> String {
    time_of(&Local::now())
}

pub fn date() -> String {
    date_of(&Local::now())
}

pub fn year() -> i32 {
    Local::now().year()
}

pub fn month() -> u32 {
    Local::now().month()
}

pub fn day() -> u32 {
    Local::now().day()
}

pub fn week_day() -> String {
    week_day_of(&Local::now())
}

pub fn hour() -> u32 {
    Local::now().hour()
}

pub fn minute() -> u32 {
    Local::now().minute()
}

pub fn second() -> u32 {
    Local::now().second()
}

pub fn millisecond() -> u32 {
    millisecond_of(&Local::now())
}

pub fn elapsed_milliseconds() -> i64 {
    elapsed_milliseconds_at(&Utc::now())
}

pub fn time_of<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}

pub fn date_of<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d").to_string()
}

/// English name of the day of the week
pub fn week_day_of<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%A").to_string()
}

pub fn millisecond_of<Tz: TimeZone>(at: &DateTime<Tz>) -> u32 {
    at.timestamp_subsec_millis().min(999)
}

pub fn elapsed_milliseconds_at<Tz: TimeZone>(at: &DateTime<Tz>) -> i64 {
    at.clone()
        .with_timezone(&Utc)
        .signed_duration_since(epoch())
        .num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sample() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-05T07:08:09.250+09:00").unwrap()
    }

    #[test]
    fn test_formats() {
        let at = sample();
        assert_eq!(time_of(&at), "07:08:09");
        assert_eq!(date_of(&at), "2024-03-05");
        assert_eq!(week_day_of(&at), "Tuesday");
        assert_eq!(millisecond_of(&at), 250);
    }

    #[test]
    fn test_elapsed_from_epoch() {
        assert_eq!(elapsed_milliseconds_at(&epoch()), 0);
        let one_day_later = DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z").unwrap();
        assert_eq!(elapsed_milliseconds_at(&one_day_later), 86_400_000);
        assert!(elapsed_milliseconds() > 0);
    }

    #[test]
    fn test_live_readings_are_in_range() {
        assert!((1..=12).contains(&month()));
        assert!((1..=31).contains(&day()));
        assert!(hour() < 24);
        assert!(minute() < 60);
        assert!(second() < 61);
        assert!(millisecond() < 1000);
        assert!(year() >= 2024);
        assert_eq!(time().len(), 8);
        assert_eq!(date().len(), 10);
    }
}
