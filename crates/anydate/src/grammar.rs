//! Recognized string grammars.
//!
//! The cascade is fixed: date-only first, then date-time with an explicit
//! zone, then date-time without one. The same patterns back the `is_*`
//! predicates that validation layers use.

use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

use crate::zone::parse_offset;

const DATE: &str = r"([0-9]{4})-([0-9]{2})-([0-9]{2})";
const TIME: &str = r"([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]+))?";

fn date_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{DATE}$")).expect("date-only pattern"))
}

fn date_time_zone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{DATE}[ T]{TIME}(Z|[+-][0-9]{{2}}:[0-9]{{2}})$"))
            .expect("zoned date-time pattern")
    })
}

fn date_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{DATE}[ T]{TIME}$")).expect("date-time pattern"))
}

/// Which grammar a string matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `YYYY-MM-DD`
    DateOnly,
    /// `YYYY-MM-DD[ T]HH:mm:ss[.SSS](±HH:mm|Z)`
    DateTimeWithZone,
    /// `YYYY-MM-DD[ T]HH:mm:ss[.SSS]`, read as UTC
    DateTimeWithoutZone,
}

pub fn classify(s: &str) -> Option<Grammar> {
    if date_only_re().is_match(s) {
        Some(Grammar::DateOnly)
    } else if date_time_zone_re().is_match(s) {
        Some(Grammar::DateTimeWithZone)
    } else if date_time_re().is_match(s) {
        Some(Grammar::DateTimeWithoutZone)
    } else {
        None
    }
}

pub fn is_date_only(s: &str) -> bool {
    date_only_re().is_match(s)
}

/// Date-time with an explicit offset or `Z`.
pub fn is_date_time(s: &str) -> bool {
    date_time_zone_re().is_match(s)
}

/// Date-only or zoned date-time. The zone-less date-time form is rejected.
pub fn is_any_date(s: &str) -> bool {
    is_date_only(s) || is_date_time(s)
}

/// A grammar match with its fields resolved. Fields that matched the shape
/// but not the calendar (month 13, hour 25) come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Matched {
    Date(Option<NaiveDate>),
    /// `offset` is `None` for the zone-less form.
    DateTime {
        wall: Option<NaiveDateTime>,
        offset: Option<FixedOffset>,
        zulu: bool,
    },
}

pub(crate) fn match_str(s: &str) -> Option<Matched> {
    if let Some(caps) = date_only_re().captures(s) {
        return Some(Matched::Date(date_from(&caps)));
    }
    if let Some(caps) = date_time_zone_re().captures(s) {
        let designator = caps.get(8).map(|m| m.as_str()).unwrap_or_default();
        return Some(Matched::DateTime {
            wall: date_time_from(&caps),
            offset: parse_offset(designator),
            zulu: designator == "Z",
        });
    }
    if let Some(caps) = date_time_re().captures(s) {
        return Some(Matched::DateTime {
            wall: date_time_from(&caps),
            offset: None,
            zulu: false,
        });
    }
    None
}

fn number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn date_from(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year = caps.get(1)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, number(caps, 2)?, number(caps, 3)?)
}

fn date_time_from(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let millis = match caps.get(7) {
        Some(frac) => fraction_to_millis(frac.as_str())?,
        None => 0,
    };
    date_from(caps)?.and_hms_milli_opt(number(caps, 4)?, number(caps, 5)?, number(caps, 6)?, millis)
}

/// Read a decimal fraction of a second as whole milliseconds, truncating
/// anything past the third digit.
pub(crate) fn fraction_to_millis(digits: &str) -> Option<u32> {
    let mut padded: String = digits.chars().take(3).collect();
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_order() {
        assert_eq!(classify("2023-09-05"), Some(Grammar::DateOnly));
        assert_eq!(
            classify("2023-09-05T17:44:36Z"),
            Some(Grammar::DateTimeWithZone)
        );
        assert_eq!(
            classify("2023-09-05 12:44:36.120+14:00"),
            Some(Grammar::DateTimeWithZone)
        );
        assert_eq!(
            classify("2023-09-05 12:44:36"),
            Some(Grammar::DateTimeWithoutZone)
        );
        assert_eq!(classify("2023-09-05T12:44"), None);
        assert_eq!(classify("05/09/2023"), None);
    }

    #[test]
    fn test_any_date_rejects_zoneless_date_time() {
        assert!(is_any_date("2023-09-05"));
        assert!(is_any_date("2023-09-05T17:44:36.000Z"));
        assert!(!is_any_date("2023-09-05T17:44:36.000"));
        assert!(!is_any_date("tomorrow"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(!is_date_only("２０２３-09-05"));
    }

    #[test]
    fn test_match_resolves_fields() {
        match match_str("2023-09-05 12:44:36.5+14:00") {
            Some(Matched::DateTime { wall, offset, zulu }) => {
                let wall = wall.unwrap();
                assert_eq!(wall.to_string(), "2023-09-05 12:44:36.500");
                assert_eq!(offset.unwrap().local_minus_utc(), 14 * 3600);
                assert!(!zulu);
            }
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_match_out_of_range_is_unresolved() {
        assert_eq!(match_str("2023-02-30"), Some(Matched::Date(None)));
        assert!(matches!(
            match_str("2023-09-05T25:00:00Z"),
            Some(Matched::DateTime { wall: None, .. })
        ));
    }

    #[test]
    fn test_fraction_to_millis() {
        assert_eq!(fraction_to_millis("5"), Some(500));
        assert_eq!(fraction_to_millis("12"), Some(120));
        assert_eq!(fraction_to_millis("123456"), Some(123));
    }
}
