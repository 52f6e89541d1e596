//! Timestamp normalization for the purchase log.
//!
//! Source timestamps may carry a UTC offset (`2019-06-12 12:07:19+00`,
//! RFC 3339, ...). The offset is dropped and the wall-clock time kept.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a timestamp into naive local time, discarding any UTC offset.
///
/// # Examples
/// ```
/// use kiosk_anomaly_data::parse_naive_timestamp;
///
/// let ts = parse_naive_timestamp("2019-06-12 12:07:19+00").unwrap();
/// assert_eq!(ts.to_string(), "2019-06-12 12:07:19");
/// ```
#[must_use]
pub fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.naive_local());
        }
    }
    parse_naive(s).or_else(|| strip_hour_offset(s).and_then(parse_naive))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Drops a trailing `+HH` / `-HH` suffix.
fn strip_hour_offset(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let n = bytes.len();
    if n < 4 {
        return None;
    }
    let sign = bytes[n - 3];
    if (sign == b'+' || sign == b'-') && bytes[n - 2..].iter().all(u8::is_ascii_digit) {
        Some(s[..n - 3].trim_end())
    } else {
        None
    }
}
