//! Lenient last-resort parsing for strings that match none of the
//! recognized grammars.
//!
//! Behaves like a platform date parser: it understands a handful of common
//! layouts, reads zone-less date-times in the local zone, and may drop
//! precision (seconds, offsets) depending on the layout matched.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::zone::Zone;

const LOCAL_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const LOCAL_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse `s` to an instant, or `None` when no layout fits.
pub(crate) fn parse(s: &str, local_zone: Tz) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = parse_with_offset(s)
        .or_else(|| parse_local(s, local_zone))
        .or_else(|| parse_partial_iso(s));
    if parsed.is_some() {
        tracing::debug!(input = s, "parsed with lenient fallback");
    }
    parsed
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn parse_local(s: &str, local_zone: Tz) -> Option<DateTime<Utc>> {
    let zone = Zone::Local(local_zone);
    LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            LOCAL_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|wall| zone.resolve(&wall))
}

/// `YYYY-MM` and `YYYY` read as UTC, the way ISO date forms are.
fn parse_partial_iso(s: &str) -> Option<DateTime<Utc>> {
    let bytes = s.as_bytes();
    let (year, month) = match bytes.len() {
        4 if bytes.iter().all(u8::is_ascii_digit) => (s.parse().ok()?, 1),
        7 if bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit) =>
        {
            (s[..4].parse().ok()?, s[5..].parse().ok()?)
        }
        _ => return None,
    };
    Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse("Tue, 5 Sep 2023 17:44:36 +0200", Tz::UTC),
            Some(utc(2023, 9, 5, 15, 44, 36))
        );
    }

    #[test]
    fn test_rfc3339_lowercase() {
        assert_eq!(
            parse("2023-09-05t17:44:36z", Tz::UTC),
            Some(utc(2023, 9, 5, 17, 44, 36))
        );
    }

    #[test]
    fn test_local_layout_uses_local_zone() {
        assert_eq!(
            parse("2023-09-05T12:44", Tz::Asia__Tokyo),
            Some(utc(2023, 9, 5, 3, 44, 0))
        );
        assert_eq!(
            parse("September 5, 2023", Tz::Asia__Tokyo),
            Some(utc(2023, 9, 4, 15, 0, 0))
        );
    }

    #[test]
    fn test_partial_iso_is_utc() {
        assert_eq!(parse("2023-09", Tz::Asia__Tokyo), Some(utc(2023, 9, 1, 0, 0, 0)));
        assert_eq!(parse("2023", Tz::Asia__Tokyo), Some(utc(2023, 1, 1, 0, 0, 0)));
        assert_eq!(parse("2023-13", Tz::UTC), None);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse("not a date", Tz::UTC), None);
        assert_eq!(parse("", Tz::UTC), None);
        assert_eq!(parse("[object Object]", Tz::UTC), None);
    }
}
