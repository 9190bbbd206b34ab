//! Date helper functions
//!
//! A post's date is a calendar date with no time-of-day or timezone attached.
//! Every projection below formats the same `NaiveDate`, so the date shown on a
//! page can never disagree with the one embedded for machines.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a front-matter date string into a calendar date
///
/// # Examples
/// ```ignore
/// parse_date("2024-01-05") // -> 2024-01-05
/// parse_date("2024/01/05 10:30") // -> 2024-01-05
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 keeps the calendar date as written, whatever the offset
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Long human-readable form (like "January 5, 2024")
pub fn date_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Short form for list items (like "Jan 05")
pub fn date_short(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

/// ISO 8601 calendar date (like "2024-01-05")
pub fn date_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// RFC 822 timestamp at midnight UTC, as RSS `pubDate` expects
pub fn date_rfc822(date: NaiveDate) -> String {
    date.format("%a, %d %b %Y 00:00:00 GMT").to_string()
}
