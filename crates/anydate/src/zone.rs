//! Zone bookkeeping for [`DateTime`](crate::DateTime).
//!
//! A date-time always knows its offset, but only sometimes knows a zone
//! name. [`Zone`] records how the value was constructed so the two can be
//! reported independently.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Zone {
    /// UTC mode.
    Utc,
    /// A fixed offset with no zone name attached.
    Fixed(FixedOffset),
    /// The host zone, picked up implicitly (native dates, records without
    /// zone information). Its name is only ever inferred.
    Local(Tz),
    /// A zone named explicitly by the caller.
    Named(Tz),
}

impl Zone {
    /// Offset in effect at `instant`.
    pub(crate) fn offset_at(&self, instant: &DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Utc => Utc.fix(),
            Zone::Fixed(offset) => *offset,
            Zone::Local(tz) | Zone::Named(tz) => {
                tz.offset_from_utc_datetime(&instant.naive_utc()).fix()
            }
        }
    }

    /// Wall-clock reading of `instant` in this zone.
    pub(crate) fn wall_clock(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset_at(instant)).naive_local()
    }

    /// Map a wall-clock reading back to an instant. Ambiguous readings take
    /// the earlier instant; readings inside a DST gap move forward by an hour.
    pub(crate) fn resolve(&self, wall: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Utc => Some(wall.and_utc()),
            Zone::Fixed(offset) => offset
                .from_local_datetime(wall)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Local(tz) | Zone::Named(tz) => tz
                .from_local_datetime(wall)
                .earliest()
                .or_else(|| {
                    let shifted = wall.checked_add_signed(TimeDelta::hours(1))?;
                    tz.from_local_datetime(&shifted).earliest()
                })
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Whether the offset string should read `UTC` rather than `+00:00`.
    /// Local mode never reports UTC, even when the host zone sits at zero.
    pub(crate) fn is_utc_at(&self, instant: &DateTime<Utc>) -> bool {
        !matches!(self, Zone::Local(_)) && self.offset_at(instant).local_minus_utc() == 0
    }
}

/// Parse an IANA timezone name.
pub(crate) fn parse_timezone(s: &str) -> Option<Tz> {
    s.trim().parse::<Tz>().ok()
}

/// Parse an offset designator: `Z`, `UTC`, `±HH:mm`, `±HHmm` or `±HH`.
pub(crate) fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Offset given as a number: magnitudes below 16 are hours, anything else
/// is minutes.
pub(crate) fn offset_from_number(value: f64) -> Option<FixedOffset> {
    if !value.is_finite() {
        return None;
    }
    let minutes = if value.abs() < 16.0 {
        (value * 60.0).round()
    } else {
        value.round()
    };
    FixedOffset::east_opt((minutes as i32).checked_mul(60)?)
}

/// Format the UTC offset as a string (e.g., "-05:00", "+09:00").
pub(crate) fn format_offset(offset: FixedOffset) -> String {
    let offset_secs = offset.local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}

/// Offset of the host zone right now.
pub(crate) fn current_offset(tz: &Tz) -> FixedOffset {
    tz.offset_from_utc_datetime(&Utc::now().naive_utc()).fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_offset_forms() {
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("+03:00").unwrap().local_minus_utc(), 10800);
        assert_eq!(parse_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_offset("+14").unwrap().local_minus_utc(), 50400);
        assert!(parse_offset("03:00").is_none());
        assert!(parse_offset("+3:0").is_none());
        assert!(parse_offset("+03:75").is_none());
    }

    #[test]
    fn test_offset_from_number() {
        assert_eq!(offset_from_number(3.0).unwrap().local_minus_utc(), 10800);
        assert_eq!(offset_from_number(-330.0).unwrap().local_minus_utc(), -19800);
        assert!(offset_from_number(f64::NAN).is_none());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(FixedOffset::east_opt(-18000).unwrap()), "-05:00");
        assert_eq!(format_offset(FixedOffset::east_opt(19800).unwrap()), "+05:30");
        assert_eq!(format_offset(Utc.fix()), "+00:00");
    }

    #[test]
    fn test_named_zone_round_trip() {
        let zone = Zone::Named(Tz::America__New_York);
        let instant = zone.resolve(&wall(2026, 1, 15, 9, 0)).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap());
        assert_eq!(zone.wall_clock(&instant), wall(2026, 1, 15, 9, 0));
        assert_eq!(format_offset(zone.offset_at(&instant)), "-05:00");
    }

    #[test]
    fn test_resolve_skips_dst_gap() {
        // 2026-03-08 02:30 does not exist in New York
        let zone = Zone::Named(Tz::America__New_York);
        let instant = zone.resolve(&wall(2026, 3, 8, 2, 30)).unwrap();
        assert_eq!(zone.wall_clock(&instant), wall(2026, 3, 8, 3, 30));
    }

    #[test]
    fn test_resolve_ambiguous_takes_earlier() {
        // 2026-11-01 01:30 happens twice in New York; the first is EDT
        let zone = Zone::Named(Tz::America__New_York);
        let instant = zone.resolve(&wall(2026, 11, 1, 1, 30)).unwrap();
        assert_eq!(format_offset(zone.offset_at(&instant)), "-04:00");
    }

    #[test]
    fn test_is_utc_at() {
        let now = Utc::now();
        assert!(Zone::Utc.is_utc_at(&now));
        assert!(Zone::Fixed(Utc.fix()).is_utc_at(&now));
        assert!(!Zone::Local(Tz::UTC).is_utc_at(&now));
        assert!(!Zone::Fixed(FixedOffset::east_opt(3600).unwrap()).is_utc_at(&now));
    }
}
