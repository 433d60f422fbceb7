//! The date-only value type.
//!
//! A [`DateOnly`] is a calendar date anchored at UTC midnight, with a
//! locale tag that drives week numbering. Invalid values carry no fields:
//! every getter returns `None` and every operation returns another invalid
//! value.

use std::cmp::Ordering;
use std::fmt;
use std::time::SystemTime;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar;
use crate::coerce::{self, AnyDate, CalendarValue};
use crate::config::{Settings, WeekRules};
use crate::date_time::DateTime;
use crate::error::Result;
use crate::format;
use crate::units::{self, Assignments, Delta, Duration, Operation, Target};

/// Rendering of an invalid value.
pub const INVALID_DATE: &str = "Invalid date";

/// A calendar date with no time of day.
#[derive(Debug, Clone)]
pub struct DateOnly {
    date: Option<NaiveDate>,
    locale: String,
}

/// Field projection returned by [`DateOnly::to_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateOnlyObject {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateOnly {
    pub(crate) fn from_parts(date: Option<NaiveDate>, locale: String) -> Self {
        Self { date, locale }
    }

    // ── Factories ───────────────────────────────────────────────────────────

    /// Today's date in UTC, in the default locale.
    pub fn now() -> Self {
        Self::now_with(&Settings::current())
    }

    pub fn now_with(settings: &Settings) -> Self {
        Self::from_parts(Some(Utc::now().date_naive()), settings.locale.clone())
    }

    /// An invalid value in the default locale.
    pub fn invalid() -> Self {
        Self::invalid_with_locale(&Settings::current().locale)
    }

    pub fn invalid_with_locale(locale: &str) -> Self {
        Self::from_parts(None, locale.to_string())
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self::from_parts(Some(date), Settings::current().locale)
    }

    /// Build from a chrono value, reading the date as that value shows it.
    pub fn from_calendar_value(value: impl Into<CalendarValue>) -> Self {
        let settings = Settings::current();
        Self::from_parts(value.into().wall_date(), settings.locale)
    }

    /// Build from a system time, taking its UTC calendar date.
    pub fn from_native_date(time: SystemTime) -> Self {
        let date = coerce::native_instant(time).map(|t| t.date_naive());
        Self::from_parts(date, Settings::current().locale)
    }

    /// Keep the date-time's own wall-clock date. No offset normalisation is
    /// applied, so `2023-09-05T23:30:00+14:00` becomes `2023-09-05`.
    pub fn from_date_time(value: &DateTime) -> Self {
        Self::from_parts(value.wall_clock().map(|w| w.date()), value.locale().to_string())
    }

    pub fn from_date_only(value: &DateOnly) -> Self {
        value.clone()
    }

    /// Coerce anything date-like into a `DateOnly`.
    ///
    /// Unrecognized input yields an invalid value; only malformed object
    /// notation is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use anydate::DateOnly;
    ///
    /// let d = DateOnly::from_any("2023-09-05").unwrap();
    /// assert_eq!(d.plus(1, "month").to_json(), "2023-10-05");
    /// assert!(!DateOnly::from_any("not a date").unwrap().is_valid());
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
        coerce::date_only(input.into(), locale, settings)
    }

    /// Strictly parse `text` against a token pattern such as `DD/MM/YYYY`.
    /// Any offset in the text is ignored; the written date is kept.
    pub fn from_format(text: &str, pattern: &str, locale: Option<&str>) -> Self {
        Self::from_format_with(text, pattern, locale, &Settings::current())
    }

    pub fn from_format_with(
        text: &str,
        pattern: &str,
        locale: Option<&str>,
        settings: &Settings,
    ) -> Self {
        let date = format::parse(text, pattern).and_then(|parsed| match parsed.timestamp {
            Some(instant) => Some(instant.date_naive()),
            None => {
                let year = Utc::now().with_timezone(&settings.local_zone).year();
                parsed.wall_clock(year).map(|w| w.date())
            }
        });
        Self::from_parts(date, settings.locale_or(locale))
    }

    // ── Getters ─────────────────────────────────────────────────────────────

    pub fn is_valid(&self) -> bool {
        self.date.is_some()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The underlying chrono date, if valid.
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    pub fn day(&self) -> Option<u32> {
        self.date.map(|d| d.day())
    }

    /// Week of the year under the locale's week rules.
    pub fn week(&self) -> Option<u32> {
        self.week_rules().week_of(self.date?)
    }

    pub fn iso_week(&self) -> Option<u32> {
        self.date.map(|d| d.iso_week().week())
    }

    /// Zero-based day of the locale week.
    pub fn weekday(&self) -> Option<u32> {
        Some(self.week_rules().weekday_index(self.date?))
    }

    /// ISO day of the week, Monday = 1 through Sunday = 7.
    pub fn iso_weekday(&self) -> Option<u32> {
        self.date.map(|d| d.weekday().number_from_monday())
    }

    pub fn day_of_year(&self) -> Option<u32> {
        self.date.map(|d| d.ordinal())
    }

    pub fn quarter(&self) -> Option<u32> {
        self.date.map(calendar::quarter)
    }

    fn week_rules(&self) -> WeekRules {
        WeekRules::for_locale(&self.locale)
    }

    // ── Builders ────────────────────────────────────────────────────────────

    fn map_date(&self, f: impl FnOnce(NaiveDate) -> Option<NaiveDate>) -> Self {
        Self::from_parts(self.date.and_then(f), self.locale.clone())
    }

    pub fn with_year(&self, year: i64) -> Self {
        self.map_date(|d| calendar::with_year(d, year))
    }

    /// Substitute the 1-based month. Month 13 is January of the next year.
    pub fn with_month(&self, month: i64) -> Self {
        self.map_date(|d| calendar::with_month(d, month))
    }

    /// Substitute the day of month. Day 0 is the last day of the previous month.
    pub fn with_day(&self, day: i64) -> Self {
        self.map_date(|d| calendar::with_day(d, day))
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
        Self::from_parts(self.date, locale.to_string())
    }

    // ── Arithmetic ──────────────────────────────────────────────────────────

    /// Add `amount` of `unit`. Clock units and unknown tokens are ignored.
    pub fn plus(&self, amount: i64, unit: &str) -> Self {
        self.plus_duration(&Duration::of(amount, unit))
    }

    pub fn minus(&self, amount: i64, unit: &str) -> Self {
        self.minus_duration(&Duration::of(amount, unit))
    }

    pub fn plus_duration(&self, duration: &Duration) -> Self {
        self.shift(Delta::from_duration(Target::DateOnly, duration))
    }

    pub fn minus_duration(&self, duration: &Duration) -> Self {
        self.shift(Delta::from_duration(Target::DateOnly, duration).negate())
    }

    fn shift(&self, delta: Delta) -> Self {
        self.map_date(|mut d| {
            if delta.total_days() != 0 {
                d = calendar::add_days(d, delta.total_days())?;
            }
            if delta.total_months() != 0 {
                d = calendar::add_months(d, delta.total_months())?;
            }
            Some(d)
        })
    }

    /// Assign `amount` to `unit`. Day-like units mean day of month.
    pub fn set(&self, amount: i64, unit: &str) -> Self {
        self.set_duration(&Duration::of(amount, unit))
    }

    pub fn set_duration(&self, duration: &Duration) -> Self {
        let set = Assignments::from_duration(Target::DateOnly, duration);
        let rules = self.week_rules();
        self.map_date(|d| calendar::assign(d, &set, &rules))
    }

    /// First day of the enclosing `unit`. Day-or-finer and unknown units
    /// return an unchanged copy.
    pub fn start_of(&self, unit: &str) -> Self {
        match units::resolve(Target::DateOnly, Operation::Truncate, unit) {
            Some(unit) => {
                let rules = self.week_rules();
                self.map_date(|d| calendar::start_of(d, unit, &rules))
            }
            None => self.clone(),
        }
    }

    /// Last day of the enclosing `unit`.
    pub fn end_of(&self, unit: &str) -> Self {
        match units::resolve(Target::DateOnly, Operation::Truncate, unit) {
            Some(unit) => {
                let rules = self.week_rules();
                self.map_date(|d| calendar::end_of(d, unit, &rules))
            }
            None => self.clone(),
        }
    }

    // ── Output ──────────────────────────────────────────────────────────────

    /// `YYYY-MM-DD`, or `"Invalid date"`.
    pub fn to_json(&self) -> String {
        match self.date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    /// UTC midnight of the date as `YYYY-MM-DDT00:00:00.000Z`.
    pub fn to_iso_string(&self) -> String {
        match self.date {
            Some(d) => d.format("%Y-%m-%dT00:00:00.000Z").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    pub fn to_object(&self) -> DateOnlyObject {
        DateOnlyObject {
            year: self.year(),
            month: self.month(),
            day: self.day(),
        }
    }

    /// Epoch milliseconds of UTC midnight.
    pub fn to_timestamp(&self) -> Option<i64> {
        Some(self.date?.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
    }

    // ── Comparison ──────────────────────────────────────────────────────────

    fn compare_with(&self, other: impl Into<AnyDate>) -> Result<Option<Ordering>> {
        let other = Self::from_any_with(other, None, &Settings::current())?;
        Ok(self.partial_cmp(&other))
    }

    /// Same day as `other` once coerced. Invalid on either side is `false`.
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

impl fmt::Display for DateOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl PartialEq for DateOnly {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for DateOnly {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.date?.cmp(&other.date?))
    }
}

impl Serialize for DateOnly {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_json())
    }
}

impl<'de> Deserialize<'de> for DateOnly {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        DateOnly::from_any(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn settings() -> Settings {
        Settings::new("en", Tz::UTC)
    }

    fn date_only(s: &str) -> DateOnly {
        DateOnly::from_any_with(s, None, &settings()).unwrap()
    }

    #[test]
    fn test_getters() {
        // 2026-02-18 is a Wednesday
        let d = date_only("2026-02-18");
        assert_eq!(d.year(), Some(2026));
        assert_eq!(d.month(), Some(2));
        assert_eq!(d.day(), Some(18));
        assert_eq!(d.quarter(), Some(1));
        assert_eq!(d.day_of_year(), Some(49));
        assert_eq!(d.iso_weekday(), Some(3));
        assert_eq!(d.weekday(), Some(3));
        assert_eq!(d.iso_week(), Some(8));
        assert_eq!(d.locale(), "en");
    }

    #[test]
    fn test_invalid_has_no_fields() {
        let d = DateOnly::invalid_with_locale("fr");
        assert!(!d.is_valid());
        assert_eq!(d.year(), None);
        assert_eq!(d.week(), None);
        assert_eq!(d.to_timestamp(), None);
        assert_eq!(d.to_json(), "Invalid date");
        assert_eq!(d.locale(), "fr");
        assert_eq!(
            d.to_object(),
            DateOnlyObject {
                year: None,
                month: None,
                day: None
            }
        );
    }

    #[test]
    fn test_builders_overflow() {
        let d = date_only("2023-04-10");
        assert_eq!(d.with_day(31).to_json(), "2023-05-01");
        assert_eq!(d.with_day(0).to_json(), "2023-03-31");
        assert_eq!(date_only("2023-01-31").with_month(2).to_json(), "2023-02-28");
        assert_eq!(d.with_month(13).to_json(), "2024-01-10");
        assert_eq!(date_only("2024-02-29").with_year(2023).to_json(), "2023-02-28");
        assert_eq!(d.with_quarter(4).to_json(), "2023-10-10");
        assert_eq!(d.with_day_of_year(1).to_json(), "2023-01-01");
    }

    #[test]
    fn test_week_builders() {
        // 2026-02-18, en locale: Sunday-start weeks
        let d = date_only("2026-02-18");
        assert_eq!(d.with_weekday(0).to_json(), "2026-02-15");
        assert_eq!(d.with_iso_week(1).to_json(), "2025-12-31");
        assert_eq!(d.with_week(d.week().unwrap() as i64 + 1).to_json(), "2026-02-25");
    }

    #[test]
    fn test_plus_and_minus() {
        let d = date_only("2023-01-31");
        assert_eq!(d.plus(1, "month").to_json(), "2023-02-28");
        assert_eq!(d.plus(1, "d").to_json(), "2023-02-01");
        assert_eq!(d.minus(1, "y").to_json(), "2022-01-31");
        assert_eq!(d.plus(2, "w").to_json(), "2023-02-14");
        assert_eq!(d.plus(1, "Q").to_json(), "2023-04-30");
    }

    #[test]
    fn test_plus_ignores_clock_and_unknown_units() {
        let d = date_only("2023-01-31");
        assert_eq!(d.plus(30, "hours"), d);
        assert_eq!(d.plus(1, "fortnight"), d);
        assert_eq!(d.plus(5, ""), d);
    }

    #[test]
    fn test_date_is_not_a_duration_unit() {
        let d = date_only("2023-09-05");
        assert_eq!(d.plus(1, "date").to_json(), "2023-09-05");
        assert_eq!(d.minus(2, "dates").to_json(), "2023-09-05");
        assert_eq!(d.plus(1, " day ").to_json(), "2023-09-05");
        assert_eq!(d.plus(1, "day").to_json(), "2023-09-06");
    }

    #[test]
    fn test_plus_duration_adds_days_before_months() {
        // Jan 30 + 1 day = Jan 31, then + 1 month clamps to Feb 28
        let d = date_only("2023-01-30");
        let duration = Duration::from([("months", 1), ("days", 1)]);
        assert_eq!(d.plus_duration(&duration).to_json(), "2023-02-28");
        assert_eq!(
            d.plus_duration(&duration).minus_duration(&duration).to_json(),
            "2023-01-27"
        );
    }

    #[test]
    fn test_set() {
        let d = date_only("2023-05-10");
        assert_eq!(d.set(31, "D").to_json(), "2023-05-31");
        assert_eq!(d.set(2, "M").to_json(), "2023-02-10");
        assert_eq!(d.set(0, "day"), d);
        assert_eq!(d.set(12, "hour"), d);
        let duration = Duration::from([("day", 31), ("month", 2), ("year", 2024)]);
        // year, month, then day: 2024-02-10 → day 31 rolls into March
        assert_eq!(d.set_duration(&duration).to_json(), "2024-03-02");
    }

    #[test]
    fn test_start_and_end_of() {
        let d = date_only("2026-02-18");
        assert_eq!(d.start_of("year").to_json(), "2026-01-01");
        assert_eq!(d.end_of("month").to_json(), "2026-02-28");
        assert_eq!(d.start_of("week").to_json(), "2026-02-15");
        assert_eq!(d.start_of("isoWeek").to_json(), "2026-02-16");
        assert_eq!(d.end_of("Q").to_json(), "2026-03-31");
        assert_eq!(d.start_of("day"), d);
        assert_eq!(d.end_of("hour"), d);
        assert_eq!(d.start_of("bogus"), d);
    }

    #[test]
    fn test_locale_changes_week_start() {
        let d = date_only("2026-02-18").with_locale("de");
        assert_eq!(d.start_of("week").to_json(), "2026-02-16");
        assert_eq!(d.weekday(), Some(2));
    }

    #[test]
    fn test_arithmetic_keeps_invalid() {
        let d = DateOnly::invalid_with_locale("en");
        assert!(!d.plus(1, "day").is_valid());
        assert!(!d.with_year(2020).is_valid());
        assert!(!d.start_of("month").is_valid());
    }

    #[test]
    fn test_output_formats() {
        let d = date_only("2023-09-05");
        assert_eq!(d.to_string(), "2023-09-05");
        assert_eq!(d.to_iso_string(), "2023-09-05T00:00:00.000Z");
        assert_eq!(d.to_timestamp(), Some(1_693_872_000_000));
        assert_eq!(
            serde_json::to_value(d.to_object()).unwrap(),
            serde_json::json!({"year": 2023, "month": 9, "day": 5})
        );
    }

    #[test]
    fn test_ordering() {
        let a = date_only("2023-09-05");
        let b = date_only("2023-09-06");
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a, date_only("2023-09-05").with_locale("fr"));
        let invalid = DateOnly::invalid_with_locale("en");
        assert_ne!(invalid, invalid.clone());
        assert_eq!(a.partial_cmp(&invalid), None);
    }

    #[test]
    fn test_from_date_time_keeps_wall_date() {
        let dt = DateTime::from_any_with("2023-09-05T23:30:00+14:00", None, &settings()).unwrap();
        assert_eq!(DateOnly::from_date_time(&dt).to_json(), "2023-09-05");
    }

    #[test]
    fn test_from_format() {
        let d = DateOnly::from_format_with("27/10/2020", "DD/MM/YYYY", None, &settings());
        assert_eq!(d.to_json(), "2020-10-27");
        let d = DateOnly::from_format_with(
            "2020-10-27 23:00 -05:00",
            "YYYY-MM-DD HH:mm Z",
            Some("de"),
            &settings(),
        );
        assert_eq!(d.to_json(), "2020-10-27");
        assert_eq!(d.locale(), "de");
        let d = DateOnly::from_format_with("2020-10-27", "DD/MM/YYYY", None, &settings());
        assert!(!d.is_valid());
    }

    #[test]
    fn test_serde() {
        let d = date_only("2023-09-05");
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2023-09-05\"");
        let back: DateOnly = serde_json::from_str("\"2023-09-05\"").unwrap();
        assert_eq!(back, d);
        let bad: DateOnly = serde_json::from_str("\"garbage\"").unwrap();
        assert!(!bad.is_valid());
    }
}
