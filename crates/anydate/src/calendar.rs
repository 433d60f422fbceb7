//! Calendar-date math shared by both value types, with the overflow rules
//! field substitution has to reproduce.

use chrono::{Datelike, Months, NaiveDate, TimeDelta};

use crate::config::WeekRules;
use crate::units::{Assignments, Unit};

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - first).num_days() as u32)
}

pub(crate) fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Calendar month arithmetic; the day is clamped to the target month.
pub(crate) fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// Substitute the year. Feb 29 becomes Feb 28 outside leap years.
pub(crate) fn with_year(date: NaiveDate, year: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    let day = date.day().min(days_in_month(year, date.month())?);
    NaiveDate::from_ymd_opt(year, date.month(), day)
}

/// Substitute the 1-based month. Out-of-range months roll into adjacent
/// years and the day is clamped to the resulting month's length.
pub(crate) fn with_month(date: NaiveDate, month: i64) -> Option<NaiveDate> {
    let zero_based = month.checked_sub(1)?;
    let year = i64::from(date.year()).checked_add(zero_based.div_euclid(12))?;
    let year = i32::try_from(year).ok()?;
    let month = (zero_based.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Substitute the day of month. Out-of-range days roll into adjacent months.
pub(crate) fn with_day(date: NaiveDate, day: i64) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    add_days(first, day.checked_sub(1)?)
}

pub(crate) fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Substitute the quarter, keeping the month's position inside it.
pub(crate) fn with_quarter(date: NaiveDate, quarter: i64) -> Option<NaiveDate> {
    let position = i64::from((date.month() - 1) % 3);
    with_month(date, quarter.checked_sub(1)?.checked_mul(3)? + position + 1)
}

/// Move by whole weeks so that `current` becomes `target`.
pub(crate) fn shift_weeks(date: NaiveDate, current: u32, target: i64) -> Option<NaiveDate> {
    add_days(date, target.checked_sub(i64::from(current))?.checked_mul(7)?)
}

/// Substitute the locale weekday (0-based from the locale's first day).
pub(crate) fn with_weekday(date: NaiveDate, weekday: i64, rules: &WeekRules) -> Option<NaiveDate> {
    add_days(date, weekday.checked_sub(i64::from(rules.weekday_index(date)))?)
}

/// Substitute the 1-based day of the year, rolling into adjacent years.
pub(crate) fn with_day_of_year(date: NaiveDate, day: i64) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
    add_days(first, day.checked_sub(1)?)
}

/// Apply the date part of a `set` in priority order: year, week, isoWeek,
/// quarter, month, day.
pub(crate) fn assign(date: NaiveDate, set: &Assignments, rules: &WeekRules) -> Option<NaiveDate> {
    let mut date = date;
    if let Some(year) = set.year {
        date = with_year(date, year)?;
    }
    if let Some(week) = set.week {
        date = shift_weeks(date, rules.week_of(date)?, week)?;
    }
    if let Some(week) = set.iso_week {
        date = shift_weeks(date, date.iso_week().week(), week)?;
    }
    if let Some(quarter) = set.quarter {
        date = with_quarter(date, quarter)?;
    }
    if let Some(month) = set.month {
        date = with_month(date, month)?;
    }
    if let Some(day) = set.day {
        date = with_day(date, day)?;
    }
    Some(date)
}

/// First calendar day of the `unit` containing `date`. Day-or-finer units
/// leave the date unchanged.
pub(crate) fn start_of(date: NaiveDate, unit: Unit, rules: &WeekRules) -> Option<NaiveDate> {
    match unit {
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        Unit::Quarter => NaiveDate::from_ymd_opt(date.year(), (quarter(date) - 1) * 3 + 1, 1),
        Unit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        Unit::Week => rules.week_start(date),
        Unit::IsoWeek => WeekRules::ISO.week_start(date),
        Unit::Day | Unit::Hour | Unit::Minute | Unit::Second | Unit::Millisecond => Some(date),
    }
}

/// Last calendar day of the `unit` containing `date`.
pub(crate) fn end_of(date: NaiveDate, unit: Unit, rules: &WeekRules) -> Option<NaiveDate> {
    let start = start_of(date, unit, rules)?;
    match unit {
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        Unit::Quarter => add_months(start, 3)?.pred_opt(),
        Unit::Month => add_months(start, 1)?.pred_opt(),
        Unit::Week | Unit::IsoWeek => add_days(start, 6),
        Unit::Day | Unit::Hour | Unit::Minute | Unit::Second | Unit::Millisecond => Some(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 13), None);
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months(date(2024, 3, 31), -1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 11, 15), 14), Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_with_day_rolls_over() {
        assert_eq!(with_day(date(2023, 4, 10), 31), Some(date(2023, 5, 1)));
        assert_eq!(with_day(date(2023, 3, 10), 0), Some(date(2023, 2, 28)));
        assert_eq!(with_day(date(2023, 3, 10), 15), Some(date(2023, 3, 15)));
    }

    #[test]
    fn test_with_month_rolls_year_and_clamps_day() {
        assert_eq!(with_month(date(2023, 1, 31), 2), Some(date(2023, 2, 28)));
        assert_eq!(with_month(date(2023, 5, 10), 13), Some(date(2024, 1, 10)));
        assert_eq!(with_month(date(2023, 5, 10), 0), Some(date(2022, 12, 10)));
        assert_eq!(with_month(date(2023, 5, 10), 7), Some(date(2023, 7, 10)));
    }

    #[test]
    fn test_with_year_clamps_leap_day() {
        assert_eq!(with_year(date(2024, 2, 29), 2023), Some(date(2023, 2, 28)));
        assert_eq!(with_year(date(2024, 2, 29), 2028), Some(date(2028, 2, 29)));
    }

    #[test]
    fn test_with_quarter_keeps_position() {
        // Feb is the 2nd month of Q1 → 2nd month of Q3 is Aug
        assert_eq!(with_quarter(date(2023, 2, 14), 3), Some(date(2023, 8, 14)));
    }

    #[test]
    fn test_with_weekday_and_day_of_year() {
        let wed = date(2026, 2, 18);
        assert_eq!(with_weekday(wed, 0, &WeekRules::ISO), Some(date(2026, 2, 16)));
        assert_eq!(
            with_weekday(wed, 0, &WeekRules::for_locale("en")),
            Some(date(2026, 2, 15))
        );
        assert_eq!(with_day_of_year(wed, 1), Some(date(2026, 1, 1)));
        assert_eq!(with_day_of_year(wed, 366), Some(date(2027, 1, 1)));
    }

    #[test]
    fn test_assign_priority_order() {
        // month before day: Jan 31 → set month 2 clamps to Feb 28, then day 30 rolls
        let set = Assignments {
            month: Some(2),
            day: Some(30),
            ..Assignments::default()
        };
        assert_eq!(
            assign(date(2023, 1, 31), &set, &WeekRules::ISO),
            Some(date(2023, 3, 2))
        );
        let set = Assignments {
            year: Some(2023),
            iso_week: Some(1),
            ..Assignments::default()
        };
        assert_eq!(
            assign(date(2026, 2, 18), &set, &WeekRules::ISO),
            Some(date(2023, 1, 7))
        );
    }

    #[test]
    fn test_start_and_end_of() {
        let rules = WeekRules::ISO;
        let d = date(2026, 2, 18);
        assert_eq!(start_of(d, Unit::Year, &rules), Some(date(2026, 1, 1)));
        assert_eq!(end_of(d, Unit::Year, &rules), Some(date(2026, 12, 31)));
        assert_eq!(start_of(d, Unit::Quarter, &rules), Some(date(2026, 1, 1)));
        assert_eq!(end_of(d, Unit::Quarter, &rules), Some(date(2026, 3, 31)));
        assert_eq!(end_of(d, Unit::Month, &rules), Some(date(2026, 2, 28)));
        assert_eq!(start_of(d, Unit::IsoWeek, &rules), Some(date(2026, 2, 16)));
        assert_eq!(end_of(d, Unit::IsoWeek, &rules), Some(date(2026, 2, 22)));
        assert_eq!(start_of(d, Unit::Day, &rules), Some(d));
    }
}
