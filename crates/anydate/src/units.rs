//! Unit-of-time tokens and durations.
//!
//! Tokens are resolved against a per-operation allow-list. Anything that
//! does not resolve is dropped silently: truncation returns the value
//! unchanged and durations lose the offending key.

use std::fmt;

/// A calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Year,
    Quarter,
    Month,
    Week,
    IsoWeek,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl Unit {
    /// Resolve a unit token. Single-letter aliases are case-sensitive
    /// (`M` is month, `m` is minute); word forms are not.
    pub fn parse(token: &str) -> Option<Unit> {
        let unit = match token {
            "y" => Unit::Year,
            "Q" => Unit::Quarter,
            "M" => Unit::Month,
            "w" => Unit::Week,
            "W" => Unit::IsoWeek,
            "d" | "D" => Unit::Day,
            "h" => Unit::Hour,
            "m" => Unit::Minute,
            "s" => Unit::Second,
            "ms" => Unit::Millisecond,
            _ => match token.to_ascii_lowercase().as_str() {
                "year" | "years" => Unit::Year,
                "quarter" | "quarters" => Unit::Quarter,
                "month" | "months" => Unit::Month,
                "week" | "weeks" => Unit::Week,
                "isoweek" | "isoweeks" => Unit::IsoWeek,
                "day" | "days" => Unit::Day,
                "hour" | "hours" => Unit::Hour,
                "minute" | "minutes" => Unit::Minute,
                "second" | "seconds" => Unit::Second,
                "millisecond" | "milliseconds" => Unit::Millisecond,
                _ => return None,
            },
        };
        Some(unit)
    }

    /// Canonical plural name.
    pub fn name(self) -> &'static str {
        match self {
            Unit::Year => "years",
            Unit::Quarter => "quarters",
            Unit::Month => "months",
            Unit::Week => "weeks",
            Unit::IsoWeek => "isoWeeks",
            Unit::Day => "days",
            Unit::Hour => "hours",
            Unit::Minute => "minutes",
            Unit::Second => "seconds",
            Unit::Millisecond => "milliseconds",
        }
    }

    fn is_calendar(self) -> bool {
        matches!(
            self,
            Unit::Year | Unit::Quarter | Unit::Month | Unit::Week | Unit::IsoWeek
        )
    }

    fn is_clock(self) -> bool {
        matches!(self, Unit::Hour | Unit::Minute | Unit::Second)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation a unit token is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    /// `plus`, `minus` and `set`.
    Shift,
    /// `start_of` and `end_of`.
    Truncate,
}

/// Which value type the token is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    DateOnly,
    DateTime,
}

pub(crate) fn allows(target: Target, op: Operation, unit: Unit) -> bool {
    match (target, op) {
        (Target::DateOnly, Operation::Shift) => unit.is_calendar() || unit == Unit::Day,
        (Target::DateOnly, Operation::Truncate) => unit.is_calendar(),
        (Target::DateTime, _) => unit.is_calendar() || unit == Unit::Day || unit.is_clock(),
    }
}

/// Resolve `token` for `op` on `target`, or `None` when it is unknown or
/// not permitted there.
pub(crate) fn resolve(target: Target, op: Operation, token: &str) -> Option<Unit> {
    Unit::parse(token).filter(|unit| allows(target, op, *unit))
}

// ── Duration ────────────────────────────────────────────────────────────────

/// An unvalidated duration record: unit tokens mapped to amounts, in the
/// order given. Validation happens when the duration is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duration {
    entries: Vec<(String, i64)>,
}

impl Duration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-entry duration, the rewrite of `plus(amount, unit)`.
    pub fn of(amount: i64, unit: impl Into<String>) -> Self {
        Self::new().with(unit, amount)
    }

    pub fn with(mut self, unit: impl Into<String>, amount: i64) -> Self {
        self.entries.push((unit.into(), amount));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, const N: usize> From<[(S, i64); N]> for Duration {
    fn from(entries: [(S, i64); N]) -> Self {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The accepted part of a [`Duration`], summed per unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Delta {
    pub years: i64,
    pub quarters: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Delta {
    pub(crate) fn from_duration(target: Target, duration: &Duration) -> Delta {
        let mut delta = Delta::default();
        for (unit, amount) in accepted(target, duration) {
            let slot = match unit {
                Unit::Year => &mut delta.years,
                Unit::Quarter => &mut delta.quarters,
                Unit::Month => &mut delta.months,
                Unit::Week | Unit::IsoWeek => &mut delta.weeks,
                Unit::Day => &mut delta.days,
                Unit::Hour => &mut delta.hours,
                Unit::Minute => &mut delta.minutes,
                Unit::Second => &mut delta.seconds,
                Unit::Millisecond => continue,
            };
            *slot = slot.saturating_add(amount);
        }
        delta
    }

    pub(crate) fn negate(self) -> Delta {
        Delta {
            years: self.years.saturating_neg(),
            quarters: self.quarters.saturating_neg(),
            months: self.months.saturating_neg(),
            weeks: self.weeks.saturating_neg(),
            days: self.days.saturating_neg(),
            hours: self.hours.saturating_neg(),
            minutes: self.minutes.saturating_neg(),
            seconds: self.seconds.saturating_neg(),
        }
    }

    pub(crate) fn total_months(&self) -> i64 {
        self.years
            .saturating_mul(12)
            .saturating_add(self.quarters.saturating_mul(3))
            .saturating_add(self.months)
    }

    pub(crate) fn total_days(&self) -> i64 {
        self.weeks.saturating_mul(7).saturating_add(self.days)
    }

    pub(crate) fn total_millis(&self) -> i64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
            .saturating_mul(1000)
    }
}

/// Absolute field assignments from a [`Duration`], last entry winning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Assignments {
    pub year: Option<i64>,
    pub week: Option<i64>,
    pub iso_week: Option<i64>,
    pub quarter: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub hour: Option<i64>,
    pub minute: Option<i64>,
    pub second: Option<i64>,
}

impl Assignments {
    pub(crate) fn from_duration(target: Target, duration: &Duration) -> Assignments {
        let mut set = Assignments::default();
        for (unit, amount) in accepted(target, duration) {
            let slot = match unit {
                Unit::Year => &mut set.year,
                Unit::Quarter => &mut set.quarter,
                Unit::Month => &mut set.month,
                Unit::Week => &mut set.week,
                Unit::IsoWeek => &mut set.iso_week,
                Unit::Day => &mut set.day,
                Unit::Hour => &mut set.hour,
                Unit::Minute => &mut set.minute,
                Unit::Second => &mut set.second,
                Unit::Millisecond => continue,
            };
            *slot = Some(amount);
        }
        set
    }
}

/// Entries that survive filtering: known, allowed for `target`, non-zero.
fn accepted(target: Target, duration: &Duration) -> impl Iterator<Item = (Unit, i64)> + '_ {
    duration.iter().filter_map(move |(token, amount)| {
        if amount == 0 {
            return None;
        }
        match resolve(target, Operation::Shift, token) {
            Some(unit) => Some((unit, amount)),
            None => {
                tracing::trace!(unit = token, amount, "dropping unsupported duration key");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Unit::parse("M"), Some(Unit::Month));
        assert_eq!(Unit::parse("m"), Some(Unit::Minute));
        assert_eq!(Unit::parse("Months"), Some(Unit::Month));
        assert_eq!(Unit::parse("isoWeek"), Some(Unit::IsoWeek));
        assert_eq!(Unit::parse("W"), Some(Unit::IsoWeek));
        assert_eq!(Unit::parse("D"), Some(Unit::Day));
        assert_eq!(Unit::parse("date"), None);
        assert_eq!(Unit::parse("dates"), None);
        assert_eq!(Unit::parse(" day "), None);
        assert_eq!(Unit::parse("days\n"), None);
        assert_eq!(Unit::parse("q"), None);
        assert_eq!(Unit::parse(""), None);
        assert_eq!(Unit::parse("clocks"), None);
    }

    #[test]
    fn test_date_only_allow_lists() {
        let t = Target::DateOnly;
        assert_eq!(resolve(t, Operation::Shift, "days"), Some(Unit::Day));
        assert_eq!(resolve(t, Operation::Truncate, "day"), None);
        assert_eq!(resolve(t, Operation::Truncate, "hour"), None);
        assert_eq!(resolve(t, Operation::Shift, "hours"), None);
        assert_eq!(resolve(t, Operation::Truncate, "Q"), Some(Unit::Quarter));
    }

    #[test]
    fn test_date_time_allow_lists() {
        let t = Target::DateTime;
        assert_eq!(resolve(t, Operation::Truncate, "day"), Some(Unit::Day));
        assert_eq!(resolve(t, Operation::Truncate, "s"), Some(Unit::Second));
        assert_eq!(resolve(t, Operation::Truncate, "ms"), None);
        assert_eq!(resolve(t, Operation::Shift, "milliseconds"), None);
    }

    #[test]
    fn test_delta_drops_unknown_and_zero() {
        let d = Duration::from([("clocks", 9), ("months", 0), ("y", 2), ("d", 3)]);
        let delta = Delta::from_duration(Target::DateOnly, &d);
        assert_eq!(
            delta,
            Delta {
                years: 2,
                days: 3,
                ..Delta::default()
            }
        );
    }

    #[test]
    fn test_delta_totals() {
        let d = Duration::new()
            .with("years", 1)
            .with("Q", 1)
            .with("w", 2)
            .with("h", 1)
            .with("m", 30);
        let delta = Delta::from_duration(Target::DateTime, &d);
        assert_eq!(delta.total_months(), 15);
        assert_eq!(delta.total_days(), 14);
        assert_eq!(delta.total_millis(), 5_400_000);
        assert_eq!(delta.negate().total_months(), -15);
    }

    #[test]
    fn test_date_only_ignores_clock_units() {
        let d = Duration::of(5, "hours");
        assert_eq!(Delta::from_duration(Target::DateOnly, &d), Delta::default());
    }

    #[test]
    fn test_assignments_last_wins() {
        let d = Duration::from([("month", 3), ("M", 7), ("D", 31), ("date", 4), ("hour", 0)]);
        let set = Assignments::from_duration(Target::DateTime, &d);
        assert_eq!(set.month, Some(7));
        assert_eq!(set.day, Some(31));
        assert_eq!(set.hour, None);
    }
}
