//! The date-time value type.
//!
//! A [`DateTime`] is an absolute instant (millisecond precision) plus the
//! zone it is viewed in. Getters report the wall clock in that zone;
//! equality and ordering only look at the instant.

use std::cmp::Ordering;
use std::fmt;
use std::time::SystemTime;

use chrono::{Datelike, FixedOffset, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar;
use crate::coerce::{self, AnyDate, CalendarValue};
use crate::config::{Settings, WeekRules};
use crate::date_only::{DateOnly, INVALID_DATE};
use crate::error::Result;
use crate::format;
use crate::units::{self, Assignments, Delta, Duration, Operation, Target, Unit};
use crate::zone::{self, Zone};

type Instant = chrono::DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Moment {
    instant: Instant,
    zone: Zone,
}

impl Moment {
    fn wall_clock(&self) -> NaiveDateTime {
        self.zone.wall_clock(&self.instant)
    }

    /// Move to a new wall-clock reading in the same zone.
    fn at_wall(&self, wall: &NaiveDateTime) -> Option<Moment> {
        Some(Moment {
            instant: self.zone.resolve(wall)?,
            zone: self.zone,
        })
    }
}

/// A calendar date and time of day with an offset.
#[derive(Debug, Clone)]
pub struct DateTime {
    moment: Option<Moment>,
    locale: String,
}

/// Field projection returned by [`DateTime::to_object`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTimeObject {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub millisecond: Option<u32>,
    pub offset: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// Rebuild the time of day from (possibly out-of-range) clock fields,
/// rolling overflow into neighbouring days.
fn with_clock(
    wall: NaiveDateTime,
    hour: i64,
    minute: i64,
    second: i64,
    millis: i64,
) -> Option<NaiveDateTime> {
    let total = hour
        .checked_mul(3_600_000)?
        .checked_add(minute.checked_mul(60_000)?)?
        .checked_add(second.checked_mul(1000)?)?
        .checked_add(millis)?;
    wall.date()
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_milliseconds(total)?)
}

fn millisecond_of(wall: &NaiveDateTime) -> u32 {
    wall.nanosecond() / 1_000_000
}

fn truncate(
    wall: NaiveDateTime,
    unit: Unit,
    rules: &WeekRules,
    edge: Edge,
) -> Option<NaiveDateTime> {
    let (h, m, s) = (wall.hour(), wall.minute(), wall.second());
    let (date, hour, minute, second) = match unit {
        Unit::Hour => (wall.date(), Some(h), None, None),
        Unit::Minute => (wall.date(), Some(h), Some(m), None),
        Unit::Second => (wall.date(), Some(h), Some(m), Some(s)),
        _ => {
            let date = match edge {
                Edge::Start => calendar::start_of(wall.date(), unit, rules)?,
                Edge::End => calendar::end_of(wall.date(), unit, rules)?,
            };
            (date, None, None, None)
        }
    };
    let ((fill_h, fill_m, fill_s), fill_ms) = match edge {
        Edge::Start => ((0, 0, 0), 0),
        Edge::End => ((23, 59, 59), 999),
    };
    date.and_hms_milli_opt(
        hour.unwrap_or(fill_h),
        minute.unwrap_or(fill_m),
        second.unwrap_or(fill_s),
        fill_ms,
    )
}

impl DateTime {
    pub(crate) fn at(instant: Option<Instant>, zone: Zone, locale: String) -> Self {
        // Sub-millisecond precision is not representable in the output formats.
        let instant = instant.and_then(|i| Instant::from_timestamp_millis(i.timestamp_millis()));
        Self {
            moment: instant.map(|instant| Moment { instant, zone }),
            locale,
        }
    }

    /// Build from a wall-clock reading in `zone`.
    pub(crate) fn from_wall(wall: Option<NaiveDateTime>, zone: Zone, locale: String) -> Self {
        Self::at(wall.and_then(|w| zone.resolve(&w)), zone, locale)
    }

    pub(crate) fn instant(&self) -> Option<Instant> {
        self.moment.map(|m| m.instant)
    }

    pub(crate) fn wall_clock(&self) -> Option<NaiveDateTime> {
        self.moment.map(|m| m.wall_clock())
    }

    // ── Factories ───────────────────────────────────────────────────────────

    /// The current instant in the local zone.
    pub fn now() -> Self {
        Self::now_with(&Settings::current())
    }

    pub fn now_with(settings: &Settings) -> Self {
        Self::at(Some(Utc::now()), Zone::Local(settings.local_zone), settings.locale.clone())
    }

    pub fn invalid() -> Self {
        Self::invalid_with_locale(&Settings::current().locale)
    }

    pub fn invalid_with_locale(locale: &str) -> Self {
        Self::at(None, Zone::Utc, locale.to_string())
    }

    /// Build from a chrono value. Zoned values keep their zone; naive values
    /// are read in the local zone.
    pub fn from_calendar_value(value: impl Into<CalendarValue>) -> Self {
        let settings = Settings::current();
        let (instant, zone) = value.into().moment(settings.local_zone);
        Self::at(instant, zone, settings.locale)
    }

    /// Build from a system time, viewed in the local zone.
    pub fn from_native_date(time: SystemTime) -> Self {
        let settings = Settings::current();
        Self::at(
            coerce::native_instant(time),
            Zone::Local(settings.local_zone),
            settings.locale,
        )
    }

    /// UTC midnight of the date, with timezone `UTC`.
    pub fn from_date_only(value: &DateOnly) -> Self {
        let wall = value.as_naive_date().and_then(|d| d.and_hms_opt(0, 0, 0));
        Self::from_wall(wall, Zone::Utc, value.locale().to_string())
    }

    pub fn from_date_time(value: &DateTime) -> Self {
        value.clone()
    }

    /// Coerce anything date-like into a `DateTime`.
    ///
    /// Unrecognized input yields an invalid value; only malformed object
    /// notation is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use anydate::DateTime;
    ///
    /// let dt = DateTime::from_any("2023-09-05 12:44:36+14:00").unwrap();
    /// assert_eq!(dt.to_json(), "2023-09-04T22:44:36.000Z");
    /// assert_eq!(dt.offset().as_deref(), Some("+14:00"));
    /// assert_eq!(dt.hour(), Some(12));
    /// ```
    pub fn from_any(input: impl Into<AnyDate>) -> Result<Self> {
        Self::from_any_with(input, None, &Settings::current())
    }

    pub fn from_any_in_locale(input: impl Into<AnyDate>, locale: &str) -> Result<Self> {
        Self::from_any_with(input, Some(locale), &Settings::current())
    }

    /// Coerce with explicit settings. `locale` overrides both the settings
    /// and the locale of an input that is already a value type.
    pub fn from_any_with(
        input: impl Into<AnyDate>,
        locale: Option<&str>,
        settings: &Settings,
    ) -> Result<Self> {
        coerce::date_time(input.into(), locale, settings)
    }

    /// Strictly parse `text` against a token pattern such as
    /// `YYYY-MM-DD HH:mm Z`. Without an offset token the wall clock is read
    /// in the local zone; with one, the offset is kept.
    pub fn from_format(text: &str, pattern: &str, locale: Option<&str>) -> Self {
        Self::from_format_with(text, pattern, locale, &Settings::current())
    }

    pub fn from_format_with(
        text: &str,
        pattern: &str,
        locale: Option<&str>,
        settings: &Settings,
    ) -> Self {
        let locale = settings.locale_or(locale);
        let local = Zone::Local(settings.local_zone);
        let Some(parsed) = format::parse(text, pattern) else {
            return Self::at(None, local, locale);
        };
        if let Some(instant) = parsed.timestamp {
            return Self::at(Some(instant), local, locale);
        }
        let year = Utc::now().with_timezone(&settings.local_zone).year();
        let zone = parsed.offset.map_or(local, Zone::Fixed);
        Self::from_wall(parsed.wall_clock(year), zone, locale)
    }

    // ── Getters ─────────────────────────────────────────────────────────────

    pub fn is_valid(&self) -> bool {
        self.moment.is_some()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The instant at its own offset, if valid.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        let m = self.moment?;
        Some(m.instant.with_timezone(&m.zone.offset_at(&m.instant)))
    }

    pub fn year(&self) -> Option<i32> {
        self.wall_clock().map(|w| w.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.month())
    }

    pub fn day(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.day())
    }

    pub fn hour(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.hour())
    }

    pub fn minute(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.minute())
    }

    pub fn second(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.second())
    }

    pub fn millisecond(&self) -> Option<u32> {
        self.wall_clock().map(|w| millisecond_of(&w))
    }

    pub fn week(&self) -> Option<u32> {
        self.week_rules().week_of(self.wall_clock()?.date())
    }

    pub fn iso_week(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.iso_week().week())
    }

    /// Zero-based day of the locale week.
    pub fn weekday(&self) -> Option<u32> {
        Some(self.week_rules().weekday_index(self.wall_clock()?.date()))
    }

    pub fn iso_weekday(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.weekday().number_from_monday())
    }

    pub fn day_of_year(&self) -> Option<u32> {
        self.wall_clock().map(|w| w.ordinal())
    }

    pub fn quarter(&self) -> Option<u32> {
        self.wall_clock().map(|w| calendar::quarter(w.date()))
    }

    /// `UTC` in UTC mode, otherwise `±HH:mm`.
    pub fn offset(&self) -> Option<String> {
        let m = self.moment?;
        if m.zone.is_utc_at(&m.instant) {
            Some("UTC".to_string())
        } else {
            Some(zone::format_offset(m.zone.offset_at(&m.instant)))
        }
    }

    /// Best-effort zone name, see [`DateTime::timezone_with`].
    pub fn timezone(&self) -> Option<String> {
        self.timezone_with(&Settings::current())
    }

    /// Zone name for this value: `UTC` when the offset is UTC, the zone it
    /// was bound to when named explicitly, or the local zone's name when the
    /// offset matches the local zone's offset right now.
    pub fn timezone_with(&self, settings: &Settings) -> Option<String> {
        let m = self.moment?;
        if m.zone.is_utc_at(&m.instant) {
            return Some("UTC".to_string());
        }
        let local = match m.zone {
            Zone::Named(tz) => return Some(tz.name().to_string()),
            Zone::Local(tz) => tz,
            Zone::Utc | Zone::Fixed(_) => settings.local_zone,
        };
        (m.zone.offset_at(&m.instant) == zone::current_offset(&local))
            .then(|| local.name().to_string())
    }

    fn week_rules(&self) -> WeekRules {
        WeekRules::for_locale(&self.locale)
    }

    // ── Zones ───────────────────────────────────────────────────────────────

    fn with_zone(&self, zone: Zone) -> Self {
        Self {
            moment: self.moment.map(|m| Moment { zone, ..m }),
            locale: self.locale.clone(),
        }
    }

    /// Same instant viewed in the named IANA zone. Unknown names give an
    /// invalid value.
    pub fn in_timezone(&self, name: &str) -> Self {
        match zone::parse_timezone(name) {
            Some(tz) => self.with_zone(Zone::Named(tz)),
            None => {
                tracing::warn!(timezone = name, "unknown timezone");
                Self::invalid_with_locale(&self.locale)
            }
        }
    }

    /// Same instant with a fixed offset (`+05:30`, `-0800`, `Z`).
    pub fn with_offset(&self, offset: &str) -> Self {
        match zone::parse_offset(offset) {
            Some(offset) => self.with_zone(Zone::Fixed(offset)),
            None => {
                tracing::warn!(offset, "unparseable offset");
                Self::invalid_with_locale(&self.locale)
            }
        }
    }

    /// Same instant in UTC mode.
    pub fn utc(&self) -> Self {
        self.with_zone(Zone::Utc)
    }

    // ── Builders ────────────────────────────────────────────────────────────

    fn map_wall(&self, f: impl FnOnce(NaiveDateTime) -> Option<NaiveDateTime>) -> Self {
        Self {
            moment: self.moment.and_then(|m| m.at_wall(&f(m.wall_clock())?)),
            locale: self.locale.clone(),
        }
    }

    fn map_date(&self, f: impl FnOnce(chrono::NaiveDate) -> Option<chrono::NaiveDate>) -> Self {
        self.map_wall(|w| Some(f(w.date())?.and_time(w.time())))
    }

    fn map_clock(&self, f: impl FnOnce([i64; 4]) -> [i64; 4]) -> Self {
        self.map_wall(|w| {
            let [h, m, s, ms] = f([
                i64::from(w.hour()),
                i64::from(w.minute()),
                i64::from(w.second()),
                i64::from(millisecond_of(&w)),
            ]);
            with_clock(w, h, m, s, ms)
        })
    }

    pub fn with_year(&self, year: i64) -> Self {
        self.map_date(|d| calendar::with_year(d, year))
    }

    pub fn with_month(&self, month: i64) -> Self {
        self.map_date(|d| calendar::with_month(d, month))
    }

    pub fn with_day(&self, day: i64) -> Self {
        self.map_date(|d| calendar::with_day(d, day))
    }

    /// Substitute the hour. 24 is midnight of the next day.
    pub fn with_hour(&self, hour: i64) -> Self {
        self.map_clock(|[_, m, s, ms]| [hour, m, s, ms])
    }

    pub fn with_minute(&self, minute: i64) -> Self {
        self.map_clock(|[h, _, s, ms]| [h, minute, s, ms])
    }

    pub fn with_second(&self, second: i64) -> Self {
        self.map_clock(|[h, m, _, ms]| [h, m, second, ms])
    }

    pub fn with_millisecond(&self, millisecond: i64) -> Self {
        self.map_clock(|[h, m, s, _]| [h, m, s, millisecond])
    }

    pub fn with_week(&self, week: i64) -> Self {
        let rules = self.week_rules();
        self.map_date(|d| calendar::shift_weeks(d, rules.week_of(d)?, week))
    }

    pub fn with_iso_week(&self, week: i64) -> Self {
        self.map_date(|d| calendar::shift_weeks(d, d.iso_week().week(), week))
    }

    pub fn with_quarter(&self, quarter: i64) -> Self {
        self.map_date(|d| calendar::with_quarter(d, quarter))
    }

    pub fn with_weekday(&self, weekday: i64) -> Self {
        let rules = self.week_rules();
        self.map_date(|d| calendar::with_weekday(d, weekday, &rules))
    }

    pub fn with_day_of_year(&self, day: i64) -> Self {
        self.map_date(|d| calendar::with_day_of_year(d, day))
    }

    pub fn with_locale(&self, locale: &str) -> Self {
        Self {
            moment: self.moment,
            locale: locale.to_string(),
        }
    }

    // ── Arithmetic ──────────────────────────────────────────────────────────

    pub fn plus(&self, amount: i64, unit: &str) -> Self {
        self.plus_duration(&Duration::of(amount, unit))
    }

    pub fn minus(&self, amount: i64, unit: &str) -> Self {
        self.minus_duration(&Duration::of(amount, unit))
    }

    /// Add a duration: clock units on the instant, then days on the wall
    /// clock, then months with the day clamped.
    pub fn plus_duration(&self, duration: &Duration) -> Self {
        self.shift(Delta::from_duration(Target::DateTime, duration))
    }

    pub fn minus_duration(&self, duration: &Duration) -> Self {
        self.shift(Delta::from_duration(Target::DateTime, duration).negate())
    }

    fn shift(&self, delta: Delta) -> Self {
        let moment = self.moment.and_then(|m| {
            let mut m = Moment {
                instant: m
                    .instant
                    .checked_add_signed(TimeDelta::try_milliseconds(delta.total_millis())?)?,
                ..m
            };
            if delta.total_days() != 0 {
                let wall = m.wall_clock();
                let date = calendar::add_days(wall.date(), delta.total_days())?;
                m = m.at_wall(&date.and_time(wall.time()))?;
            }
            if delta.total_months() != 0 {
                let wall = m.wall_clock();
                let date = calendar::add_months(wall.date(), delta.total_months())?;
                m = m.at_wall(&date.and_time(wall.time()))?;
            }
            Some(m)
        });
        Self {
            moment,
            locale: self.locale.clone(),
        }
    }

    pub fn set(&self, amount: i64, unit: &str) -> Self {
        self.set_duration(&Duration::of(amount, unit))
    }

    /// Assign fields in priority order: year, week, isoWeek, quarter, month,
    /// day, hour, minute, second.
    pub fn set_duration(&self, duration: &Duration) -> Self {
        let set = Assignments::from_duration(Target::DateTime, duration);
        if set == Assignments::default() {
            return self.clone();
        }
        let rules = self.week_rules();
        self.map_wall(|w| {
            let w = calendar::assign(w.date(), &set, &rules)?.and_time(w.time());
            with_clock(
                w,
                set.hour.unwrap_or(i64::from(w.hour())),
                set.minute.unwrap_or(i64::from(w.minute())),
                set.second.unwrap_or(i64::from(w.second())),
                i64::from(millisecond_of(&w)),
            )
        })
    }

    fn truncate(&self, unit: &str, edge: Edge) -> Self {
        match units::resolve(Target::DateTime, Operation::Truncate, unit) {
            Some(unit) => {
                let rules = self.week_rules();
                self.map_wall(|w| truncate(w, unit, &rules, edge))
            }
            None => self.clone(),
        }
    }

    /// Start of the enclosing `unit` in this value's zone. Millisecond and
    /// unknown units return an unchanged copy.
    pub fn start_of(&self, unit: &str) -> Self {
        self.truncate(unit, Edge::Start)
    }

    /// Last millisecond of the enclosing `unit`, e.g. `23:59:59.999` for a day.
    pub fn end_of(&self, unit: &str) -> Self {
        self.truncate(unit, Edge::End)
    }

    // ── Output ──────────────────────────────────────────────────────────────

    /// UTC ISO-8601 with milliseconds, or `"Invalid date"`.
    pub fn to_json(&self) -> String {
        match self.moment {
            Some(m) => m.instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    /// ISO-8601 with milliseconds, in UTC or at the value's own offset.
    pub fn to_iso_string(&self, keep_offset: bool) -> String {
        if !keep_offset {
            return self.to_json();
        }
        match self.to_chrono() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    pub fn to_object(&self) -> DateTimeObject {
        DateTimeObject {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            second: self.second(),
            millisecond: self.millisecond(),
            offset: self.offset(),
            timezone: self.timezone(),
        }
    }

    /// Epoch milliseconds.
    pub fn to_timestamp(&self) -> Option<i64> {
        self.instant().map(|i| i.timestamp_millis())
    }

    // ── Comparison ──────────────────────────────────────────────────────────

    fn compare_with(&self, other: impl Into<AnyDate>) -> Result<Option<Ordering>> {
        let other = Self::from_any_with(other, None, &Settings::current())?;
        Ok(self.partial_cmp(&other))
    }

    /// Same instant as `other` once coerced. Invalid on either side is `false`.
    pub fn equals(&self, other: impl Into<AnyDate>) -> Result<bool> {
        Ok(self.compare_with(other)? == Some(Ordering::Equal))
    }

    pub fn is_before(&self, other: impl Into<AnyDate>) -> Result<bool> {
        Ok(self.compare_with(other)? == Some(Ordering::Less))
    }

    pub fn is_after(&self, other: impl Into<AnyDate>) -> Result<bool> {
        Ok(self.compare_with(other)? == Some(Ordering::Greater))
    }
}

/// ISO-8601 at the value's own offset, `Z` in UTC mode.
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.moment {
            Some(m) if m.zone.is_utc_at(&m.instant) => f.write_str(&self.to_json()),
            _ => f.write_str(&self.to_iso_string(true)),
        }
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.instant()?.cmp(&other.instant()?))
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_json())
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        DateTime::from_any(value).map_err(serde::de::Error::custom)
    }
}
