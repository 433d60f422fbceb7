//! Process-wide defaults and locale week rules.
//!
//! Every entry point that needs a locale or a local zone has a `*_with`
//! variant taking a [`Settings`] explicitly. The plain variants read
//! [`Settings::current`], which can be replaced once at startup (or in a
//! test harness) with [`Settings::install`].

use std::sync::{LazyLock, RwLock};

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use chrono_tz::Tz;

/// Locale used when neither the caller nor the installed settings name one.
pub const DEFAULT_LOCALE: &str = "en";

static DEFAULTS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

/// Defaults threaded through construction: the locale stamped on new values
/// and the zone treated as "local" by native-date and record coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub locale: String,
    pub local_zone: Tz,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            local_zone: system_zone(),
        }
    }
}

impl Settings {
    pub fn new(locale: impl Into<String>, local_zone: Tz) -> Self {
        Self {
            locale: locale.into(),
            local_zone,
        }
    }

    /// Snapshot of the process-wide defaults.
    pub fn current() -> Settings {
        match DEFAULTS.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the process-wide defaults.
    pub fn install(self) {
        tracing::debug!(locale = %self.locale, zone = self.local_zone.name(), "installing defaults");
        match DEFAULTS.write() {
            Ok(mut guard) => *guard = self,
            Err(poisoned) => *poisoned.into_inner() = self,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_local_zone(mut self, zone: Tz) -> Self {
        self.local_zone = zone;
        self
    }

    /// Resolve an optional per-call locale override against these settings.
    pub(crate) fn locale_or(&self, locale: Option<&str>) -> String {
        locale.unwrap_or(&self.locale).to_string()
    }
}

/// Detect the host zone, falling back to UTC when it is unknown or not in the
/// bundled tz database.
fn system_zone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

// ── Week rules ──────────────────────────────────────────────────────────────

/// Which day begins a locale week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
    /// Used by most Arabic and Persian locales.
    Saturday,
}

/// How many days `weekday` is from the week-start day.
pub(crate) fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
        WeekStartDay::Saturday => ((weekday.num_days_from_sunday() + 1) % 7) as i64,
    }
}

/// Locale week numbering: the first weekday, and which day of January is
/// guaranteed to fall into week 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRules {
    pub first_day: WeekStartDay,
    pub first_week_contains: u32,
}

impl WeekRules {
    pub const ISO: WeekRules = WeekRules {
        first_day: WeekStartDay::Monday,
        first_week_contains: 4,
    };

    pub fn for_locale(tag: &str) -> WeekRules {
        let tag = tag.trim().to_ascii_lowercase().replace('_', "-");
        let language = tag.split('-').next().unwrap_or_default();
        match (language, tag.as_str()) {
            (_, "en" | "en-us" | "en-ca" | "pt-br" | "zh-tw" | "zh-hk") => WeekRules {
                first_day: WeekStartDay::Sunday,
                first_week_contains: 1,
            },
            ("ja" | "ko" | "he", _) => WeekRules {
                first_day: WeekStartDay::Sunday,
                first_week_contains: 1,
            },
            ("ar" | "fa", _) => WeekRules {
                first_day: WeekStartDay::Saturday,
                first_week_contains: 1,
            },
            _ => WeekRules::ISO,
        }
    }

    /// Zero-based position of `date` within its locale week.
    pub fn weekday_index(&self, date: NaiveDate) -> u32 {
        days_from_week_start(date.weekday(), self.first_day) as u32
    }

    /// First day of the locale week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_signed(TimeDelta::days(
            days_from_week_start(date.weekday(), self.first_day),
        ))
    }

    fn first_week_start(&self, year: i32) -> Option<NaiveDate> {
        let anchor = NaiveDate::from_ymd_opt(year, 1, self.first_week_contains)?;
        self.week_start(anchor)
    }

    /// Locale week-of-year of `date`, rolling into the neighbouring week-year
    /// at either end of the calendar year.
    pub fn week_of(&self, date: NaiveDate) -> Option<u32> {
        let year = date.year();
        let mut start = self.first_week_start(year)?;
        if date < start {
            start = self.first_week_start(year - 1)?;
        } else if let Some(next) = self.first_week_start(year + 1) {
            if date >= next {
                start = next;
            }
        }
        Some(((date - start).num_days() / 7 + 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_settings_builders() {
        let s = Settings::new("de", Tz::Europe__Berlin).with_locale("fr");
        assert_eq!(s.locale, "fr");
        assert_eq!(s.local_zone, Tz::Europe__Berlin);
        assert_eq!(s.locale_or(None), "fr");
        assert_eq!(s.locale_or(Some("ja")), "ja");
    }

    #[test]
    fn test_week_rules_for_locale() {
        assert_eq!(WeekRules::for_locale("en").first_day, WeekStartDay::Sunday);
        assert_eq!(WeekRules::for_locale("en_US").first_day, WeekStartDay::Sunday);
        assert_eq!(WeekRules::for_locale("en-GB"), WeekRules::ISO);
        assert_eq!(WeekRules::for_locale("de"), WeekRules::ISO);
        assert_eq!(WeekRules::for_locale("ja").first_day, WeekStartDay::Sunday);
        assert_eq!(WeekRules::for_locale("ar-SA").first_day, WeekStartDay::Saturday);
    }

    #[test]
    fn test_weekday_index() {
        // 2026-02-18 is a Wednesday
        let wed = date(2026, 2, 18);
        assert_eq!(WeekRules::ISO.weekday_index(wed), 2);
        assert_eq!(WeekRules::for_locale("en").weekday_index(wed), 3);
        assert_eq!(WeekRules::for_locale("ar").weekday_index(wed), 4);
    }

    #[test]
    fn test_week_start() {
        let wed = date(2026, 2, 18);
        assert_eq!(WeekRules::ISO.week_start(wed), Some(date(2026, 2, 16)));
        assert_eq!(
            WeekRules::for_locale("en").week_start(wed),
            Some(date(2026, 2, 15))
        );
    }

    #[test]
    fn test_iso_week_matches_chrono() {
        for d in [
            date(2020, 1, 1),
            date(2020, 12, 31),
            date(2021, 1, 3),
            date(2026, 6, 15),
            date(2027, 1, 1),
        ] {
            assert_eq!(WeekRules::ISO.week_of(d), Some(d.iso_week().week()), "{d}");
        }
    }

    #[test]
    fn test_us_week_contains_jan_first() {
        let us = WeekRules::for_locale("en");
        // 2022-01-01 is a Saturday, so week 1 started Sunday 2021-12-26
        assert_eq!(us.week_of(date(2022, 1, 1)), Some(1));
        assert_eq!(us.week_of(date(2021, 12, 26)), Some(1));
        assert_eq!(us.week_of(date(2022, 1, 2)), Some(2));
    }
}
