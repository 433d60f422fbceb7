//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::{Context, Result};
use anydate::compare::compare_with;
use anydate::{AnyDate, DateOnly, DateTime, Settings};
use serde_json::{json, Value};

use crate::cli::{CompareArgs, FormatArgs, InputArgs, ShiftArgs, TruncateArgs};

/// Which value type inputs are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DateOnly,
    DateTime,
}

/// A coerced input of either type.
enum Coerced {
    Date(DateOnly),
    Time(DateTime),
}

impl Coerced {
    fn map(
        self,
        on_date: impl FnOnce(DateOnly) -> DateOnly,
        on_time: impl FnOnce(DateTime) -> DateTime,
    ) -> Self {
        match self {
            Coerced::Date(d) => Coerced::Date(on_date(d)),
            Coerced::Time(t) => Coerced::Time(on_time(t)),
        }
    }

    fn describe(&self, settings: &Settings) -> Value {
        match self {
            Coerced::Date(d) => json!({
                "type": "DateOnly",
                "valid": d.is_valid(),
                "value": d.to_json(),
                "iso": d.to_iso_string(),
                "locale": d.locale(),
                "timestamp": d.to_timestamp(),
                "object": d.to_object(),
                "week": d.week(),
                "isoWeek": d.iso_week(),
                "weekday": d.weekday(),
                "isoWeekday": d.iso_weekday(),
                "dayOfYear": d.day_of_year(),
                "quarter": d.quarter(),
            }),
            Coerced::Time(t) => {
                let mut object = t.to_object();
                object.timezone = t.timezone_with(settings);
                json!({
                    "type": "DateTime",
                    "valid": t.is_valid(),
                    "value": t.to_json(),
                    "iso": t.to_iso_string(true),
                    "locale": t.locale(),
                    "timestamp": t.to_timestamp(),
                    "object": object,
                    "week": t.week(),
                    "isoWeek": t.iso_week(),
                    "weekday": t.weekday(),
                    "isoWeekday": t.iso_weekday(),
                    "dayOfYear": t.day_of_year(),
                    "quarter": t.quarter(),
                })
            }
        }
    }
}

/// Turn a raw argument into a coercion input.
fn read_input(raw: &str, epoch: bool) -> Result<AnyDate> {
    let trimmed = raw.trim();
    if epoch {
        let millis: f64 = trimmed
            .parse()
            .with_context(|| format!("'{raw}' is not a number of milliseconds"))?;
        return Ok(AnyDate::Millis(millis));
    }
    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed).context("invalid object notation")?;
        return Ok(AnyDate::Json(value));
    }
    Ok(AnyDate::Text(raw.to_string()))
}

fn coerce(args: &InputArgs, mode: Mode, settings: &Settings) -> Result<Coerced> {
    let input = read_input(&args.input, args.epoch)?;
    tracing::debug!(input = %args.input, ?mode, "coercing");
    Ok(match mode {
        Mode::DateOnly => Coerced::Date(DateOnly::from_any_with(input, None, settings)?),
        Mode::DateTime => Coerced::Time(DateTime::from_any_with(input, None, settings)?),
    })
}

pub fn parse(args: &InputArgs, mode: Mode, settings: &Settings) -> Result<Value> {
    Ok(coerce(args, mode, settings)?.describe(settings))
}

pub fn shift(args: &ShiftArgs, mode: Mode, settings: &Settings) -> Result<Value> {
    let value = coerce(&args.input, mode, settings)?;
    let (amount, unit) = (args.amount, args.unit.as_str());
    let shifted = if args.set {
        value.map(|d| d.set(amount, unit), |t| t.set(amount, unit))
    } else if args.subtract {
        value.map(|d| d.minus(amount, unit), |t| t.minus(amount, unit))
    } else {
        value.map(|d| d.plus(amount, unit), |t| t.plus(amount, unit))
    };
    Ok(shifted.describe(settings))
}

pub fn start_of(args: &TruncateArgs, mode: Mode, settings: &Settings) -> Result<Value> {
    let unit = args.unit.as_str();
    let value = coerce(&args.input, mode, settings)?;
    Ok(value.map(|d| d.start_of(unit), |t| t.start_of(unit)).describe(settings))
}

pub fn end_of(args: &TruncateArgs, mode: Mode, settings: &Settings) -> Result<Value> {
    let unit = args.unit.as_str();
    let value = coerce(&args.input, mode, settings)?;
    Ok(value.map(|d| d.end_of(unit), |t| t.end_of(unit)).describe(settings))
}

pub fn compare(args: &CompareArgs, settings: &Settings) -> Result<Value> {
    let left = read_input(&args.left, false)?;
    let right = read_input(&args.right, false)?;
    let ordering = compare_with(left, right, settings)?;
    Ok(json!({
        "comparable": ordering.is_some(),
        "equal": ordering.is_some_and(|o| o.is_eq()),
        "before": ordering.is_some_and(|o| o.is_lt()),
        "after": ordering.is_some_and(|o| o.is_gt()),
    }))
}

pub fn format(args: &FormatArgs, mode: Mode, settings: &Settings) -> Value {
    let (text, pattern) = (args.text.as_str(), args.pattern.as_str());
    let value = match mode {
        Mode::DateOnly => Coerced::Date(DateOnly::from_format_with(text, pattern, None, settings)),
        Mode::DateTime => Coerced::Time(DateTime::from_format_with(text, pattern, None, settings)),
    };
    value.describe(settings)
}
