//! The universal coercion engine.
//!
//! Everything date-like enters through [`AnyDate`]. Unrecognized formats
//! become invalid values; the only hard failure is object notation holding
//! a field of an unsupported type.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::date_only::DateOnly;
use crate::date_time::DateTime;
use crate::error::{AnyDateError, Result};
use crate::grammar::{self, Matched};
use crate::native;
use crate::zone::{self, Zone};

type Instant = chrono::DateTime<Utc>;

/// Keys that mark a JSON object as object notation.
const RECORD_KEYS: &[&str] = &[
    "year",
    "month",
    "day",
    "date",
    "hour",
    "hours",
    "minute",
    "minutes",
    "second",
    "seconds",
    "millisecond",
    "milliseconds",
    "offset",
    "timezone",
    "tz",
];

// ── Inputs ──────────────────────────────────────────────────────────────────

/// Any input the coercion engine accepts.
#[derive(Debug, Clone)]
pub enum AnyDate {
    /// Absent value.
    Empty,
    DateOnly(DateOnly),
    DateTime(DateTime),
    /// A chrono value.
    Calendar(CalendarValue),
    /// A platform timestamp.
    Native(SystemTime),
    /// Epoch milliseconds.
    Millis(f64),
    Text(String),
    /// Explicit object notation.
    Record(FieldRecord),
    /// Free-form JSON, classified by shape.
    Json(Value),
}

/// Chrono values accepted as input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalendarValue {
    Date(NaiveDate),
    Naive(NaiveDateTime),
    Utc(chrono::DateTime<Utc>),
    Fixed(chrono::DateTime<FixedOffset>),
    Zoned(chrono::DateTime<Tz>),
}

impl CalendarValue {
    /// The calendar date as this value displays it.
    pub(crate) fn wall_date(&self) -> Option<NaiveDate> {
        Some(match self {
            CalendarValue::Date(d) => *d,
            CalendarValue::Naive(n) => n.date(),
            CalendarValue::Utc(dt) => dt.date_naive(),
            CalendarValue::Fixed(dt) => dt.date_naive(),
            CalendarValue::Zoned(dt) => dt.date_naive(),
        })
    }

    /// Instant and zone. Naive values are read in `local`.
    pub(crate) fn moment(&self, local: Tz) -> (Option<Instant>, Zone) {
        match self {
            CalendarValue::Date(d) => {
                let zone = Zone::Local(local);
                (d.and_hms_opt(0, 0, 0).and_then(|w| zone.resolve(&w)), zone)
            }
            CalendarValue::Naive(n) => {
                let zone = Zone::Local(local);
                (zone.resolve(n), zone)
            }
            CalendarValue::Utc(dt) => (Some(*dt), Zone::Utc),
            CalendarValue::Fixed(dt) => (Some(dt.with_timezone(&Utc)), Zone::Fixed(*dt.offset())),
            CalendarValue::Zoned(dt) => (Some(dt.with_timezone(&Utc)), Zone::Named(dt.timezone())),
        }
    }
}

/// A field value in object notation.
#[derive(Clone)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Evaluated when the record is coerced.
    Lazy(Arc<dyn Fn() -> FieldValue + Send + Sync>),
    /// Raw JSON. Strings and numbers are accepted, everything else is an error.
    Json(Value),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            FieldValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            FieldValue::Lazy(_) => f.write_str("Lazy(..)"),
            FieldValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
        }
    }
}

/// A field after lazy evaluation.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    /// Integer reading; fractions are truncated, non-numeric text is `None`.
    fn as_integer(&self) -> Option<i64> {
        let n = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then(|| n.trunc() as i64)
    }

    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// Type name as reported in errors, following JavaScript's `typeof`.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

impl FieldValue {
    pub fn lazy(f: impl Fn() -> FieldValue + Send + Sync + 'static) -> Self {
        FieldValue::Lazy(Arc::new(f))
    }

    fn resolve(&self, target: &'static str) -> Result<Scalar> {
        let unsupported = |type_name| AnyDateError::UnsupportedFieldType { type_name, target };
        let value = match self {
            FieldValue::Lazy(f) => match (**f)() {
                FieldValue::Lazy(_) => return Err(unsupported("function")),
                other => other,
            },
            other => other.clone(),
        };
        match value {
            FieldValue::Text(s) | FieldValue::Json(Value::String(s)) => Ok(Scalar::Text(s)),
            FieldValue::Number(n) => Ok(Scalar::Number(n)),
            FieldValue::Json(Value::Number(n)) => {
                Ok(Scalar::Number(n.as_f64().unwrap_or(f64::NAN)))
            }
            FieldValue::Json(other) => Err(unsupported(json_type_name(&other))),
            FieldValue::Lazy(_) => Err(unsupported("function")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(f64::from(n))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

/// Object notation: calendar fields by name, plus `offset` and
/// `timezone`/`tz`.
#[derive(Debug, Clone, Default)]
pub struct FieldRecord {
    fields: Vec<(String, FieldValue)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Add a field computed when the record is coerced.
    pub fn lazy(
        self,
        key: impl Into<String>,
        f: impl Fn() -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.with(key, FieldValue::lazy(f))
    }

    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::Json(v.clone())))
                .collect(),
        }
    }

    /// First field present among `keys`, tried in order.
    fn get(&self, keys: &[&str]) -> Option<&FieldValue> {
        keys.iter()
            .find_map(|key| self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    fn integer(&self, keys: &[&str], default: i64, target: &'static str) -> Result<Option<i64>> {
        match self.get(keys) {
            Some(value) => Ok(value.resolve(target)?.as_integer()),
            None => Ok(Some(default)),
        }
    }

    fn scalar(&self, keys: &[&str], target: &'static str) -> Result<Option<Scalar>> {
        self.get(keys).map(|v| v.resolve(target)).transpose()
    }
}

fn is_record_like(map: &Map<String, Value>) -> bool {
    map.keys().any(|k| RECORD_KEYS.contains(&k.as_str()))
}

// ── From impls ──────────────────────────────────────────────────────────────

impl From<DateOnly> for AnyDate {
    fn from(value: DateOnly) -> Self {
        AnyDate::DateOnly(value)
    }
}

impl From<&DateOnly> for AnyDate {
    fn from(value: &DateOnly) -> Self {
        AnyDate::DateOnly(value.clone())
    }
}

impl From<DateTime> for AnyDate {
    fn from(value: DateTime) -> Self {
        AnyDate::DateTime(value)
    }
}

impl From<&DateTime> for AnyDate {
    fn from(value: &DateTime) -> Self {
        AnyDate::DateTime(value.clone())
    }
}

impl From<CalendarValue> for AnyDate {
    fn from(value: CalendarValue) -> Self {
        AnyDate::Calendar(value)
    }
}

macro_rules! calendar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for CalendarValue {
                fn from(value: $ty) -> Self {
                    CalendarValue::$variant(value)
                }
            }

            impl From<$ty> for AnyDate {
                fn from(value: $ty) -> Self {
                    AnyDate::Calendar(CalendarValue::$variant(value))
                }
            }
        )*
    };
}

calendar_from! {
    NaiveDate => Date,
    NaiveDateTime => Naive,
    chrono::DateTime<Utc> => Utc,
    chrono::DateTime<FixedOffset> => Fixed,
    chrono::DateTime<Tz> => Zoned,
}

impl From<SystemTime> for AnyDate {
    fn from(value: SystemTime) -> Self {
        AnyDate::Native(value)
    }
}

impl From<f64> for AnyDate {
    fn from(value: f64) -> Self {
        AnyDate::Millis(value)
    }
}

impl From<i64> for AnyDate {
    fn from(value: i64) -> Self {
        AnyDate::Millis(value as f64)
    }
}

impl From<i32> for AnyDate {
    fn from(value: i32) -> Self {
        AnyDate::Millis(f64::from(value))
    }
}

impl From<&str> for AnyDate {
    fn from(value: &str) -> Self {
        AnyDate::Text(value.to_string())
    }
}

impl From<String> for AnyDate {
    fn from(value: String) -> Self {
        AnyDate::Text(value)
    }
}

impl From<&String> for AnyDate {
    fn from(value: &String) -> Self {
        AnyDate::Text(value.clone())
    }
}

impl From<FieldRecord> for AnyDate {
    fn from(value: FieldRecord) -> Self {
        AnyDate::Record(value)
    }
}

impl From<Value> for AnyDate {
    fn from(value: Value) -> Self {
        AnyDate::Json(value)
    }
}

impl<T: Into<AnyDate>> From<Option<T>> for AnyDate {
    fn from(value: Option<T>) -> Self {
        value.map_or(AnyDate::Empty, Into::into)
    }
}

// ── Dispatch ────────────────────────────────────────────────────────────────

/// Classify free-form JSON into a concrete input.
fn classify_json(value: Value) -> AnyDate {
    match value {
        Value::Null | Value::Bool(false) => AnyDate::Empty,
        Value::Number(n) => AnyDate::Millis(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => AnyDate::Text(s),
        Value::Object(map) if is_record_like(&map) => {
            AnyDate::Record(FieldRecord::from_json(&map))
        }
        other => AnyDate::Text(other.to_string()),
    }
}

/// Epoch milliseconds floored, so times before the epoch round down.
pub(crate) fn native_instant(time: SystemTime) -> Option<Instant> {
    let nanos = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i128::try_from(after.as_nanos()).ok()?,
        Err(before) => -i128::try_from(before.duration().as_nanos()).ok()?,
    };
    let millis = i64::try_from(nanos.div_euclid(1_000_000)).ok()?;
    Instant::from_timestamp_millis(millis)
}

fn millis_instant(millis: f64) -> Option<Instant> {
    if !millis.is_finite() {
        return None;
    }
    Instant::from_timestamp_millis(millis.trunc() as i64)
}

fn text_to_date(s: &str, settings: &Settings) -> Option<NaiveDate> {
    match grammar::match_str(s) {
        Some(Matched::Date(date)) => date,
        Some(Matched::DateTime { wall, offset, .. }) => match offset {
            Some(offset) => Some(Zone::Fixed(offset).resolve(&wall?)?.date_naive()),
            None => wall.map(|w| w.date()),
        },
        None => native::parse(s, settings.local_zone).map(|i| i.date_naive()),
    }
}

fn text_to_moment(s: &str, settings: &Settings) -> (Option<Instant>, Zone) {
    match grammar::match_str(s) {
        Some(Matched::Date(date)) => (
            date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|w| w.and_utc()),
            Zone::Utc,
        ),
        Some(Matched::DateTime { wall, offset, zulu }) => {
            let zone = match offset {
                Some(offset) if !zulu => Zone::Fixed(offset),
                _ => Zone::Utc,
            };
            (wall.and_then(|w| zone.resolve(&w)), zone)
        }
        None => (
            native::parse(s, settings.local_zone),
            Zone::Local(settings.local_zone),
        ),
    }
}

fn ymd(year: Option<i64>, month: Option<i64>, day: Option<i64>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year?).ok()?,
        u32::try_from(month?).ok()?,
        u32::try_from(day?).ok()?,
    )
}

fn record_to_date(record: &FieldRecord) -> Result<Option<NaiveDate>> {
    const TARGET: &str = "DateOnly";
    let month = record.integer(&["month"], 1, TARGET)?;
    let day = record.integer(&["day", "date"], 1, TARGET)?;
    let year = match record.get(&["year"]) {
        Some(value) => value.resolve(TARGET)?.as_integer(),
        None => return Ok(None),
    };
    Ok(ymd(year, month, day))
}

fn record_to_moment(
    record: &FieldRecord,
    settings: &Settings,
) -> Result<(Option<Instant>, Zone)> {
    const TARGET: &str = "DateTime";
    let this_year = Utc::now().with_timezone(&settings.local_zone).year();
    let year = record.integer(&["year"], i64::from(this_year), TARGET)?;
    let month = record.integer(&["month"], 1, TARGET)?;
    let day = record.integer(&["day", "date"], 1, TARGET)?;
    let hour = record.integer(&["hour", "hours"], 0, TARGET)?;
    let minute = record.integer(&["minute", "minutes"], 0, TARGET)?;
    let second = record.integer(&["second", "seconds"], 0, TARGET)?;
    let millis = record.integer(&["millisecond", "milliseconds"], 0, TARGET)?;
    let timezone = record.scalar(&["timezone", "tz"], TARGET)?;
    let offset = record.scalar(&["offset"], TARGET)?;

    let wall = (|| {
        ymd(year, month, day)?.and_hms_milli_opt(
            u32::try_from(hour?).ok()?,
            u32::try_from(minute?).ok()?,
            u32::try_from(second?).ok()?,
            u32::try_from(millis?).ok().filter(|ms| *ms < 1000)?,
        )
    })();

    let zone = if let Some(name) = timezone {
        let name = name.into_text();
        match zone::parse_timezone(&name) {
            Some(tz) => Zone::Named(tz),
            None => {
                tracing::warn!(timezone = %name, "unknown timezone in object notation");
                return Ok((None, Zone::Utc));
            }
        }
    } else if let Some(offset) = offset {
        let parsed = match &offset {
            Scalar::Text(s) => zone::parse_offset(s),
            Scalar::Number(n) => zone::offset_from_number(*n),
        };
        match parsed {
            // Wall clock taken as-is at the offset: the instant is wall minus offset.
            Some(offset) => Zone::Fixed(offset),
            None => return Ok((None, Zone::Utc)),
        }
    } else {
        Zone::Local(settings.local_zone)
    };
    Ok((wall.and_then(|w| zone.resolve(&w)), zone))
}

pub(crate) fn date_only(
    input: AnyDate,
    locale: Option<&str>,
    settings: &Settings,
) -> Result<DateOnly> {
    let date = match input {
        AnyDate::DateOnly(value) => {
            return Ok(match locale {
                Some(locale) => value.with_locale(locale),
                None => value,
            });
        }
        AnyDate::DateTime(value) => {
            let converted = DateOnly::from_date_time(&value);
            return Ok(match locale {
                Some(locale) => converted.with_locale(locale),
                None => converted,
            });
        }
        AnyDate::Json(value) => return date_only(classify_json(value), locale, settings),
        AnyDate::Empty => None,
        AnyDate::Calendar(value) => value.wall_date(),
        AnyDate::Native(time) => native_instant(time).map(|i| i.date_naive()),
        AnyDate::Millis(millis) => millis_instant(millis).map(|i| i.date_naive()),
        AnyDate::Text(s) if s.is_empty() => None,
        AnyDate::Text(s) => text_to_date(&s, settings),
        AnyDate::Record(record) => record_to_date(&record)?,
    };
    Ok(DateOnly::from_parts(date, settings.locale_or(locale)))
}

pub(crate) fn date_time(
    input: AnyDate,
    locale: Option<&str>,
    settings: &Settings,
) -> Result<DateTime> {
    let local = Zone::Local(settings.local_zone);
    let (instant, zone) = match input {
        AnyDate::DateTime(value) => {
            return Ok(match locale {
                Some(locale) => value.with_locale(locale),
                None => value,
            });
        }
        AnyDate::DateOnly(value) => {
            let converted = DateTime::from_date_only(&value);
            return Ok(match locale {
                Some(locale) => converted.with_locale(locale),
                None => converted,
            });
        }
        AnyDate::Json(value) => return date_time(classify_json(value), locale, settings),
        AnyDate::Empty => (None, Zone::Utc),
        AnyDate::Calendar(value) => value.moment(settings.local_zone),
        AnyDate::Native(time) => (native_instant(time), local),
        AnyDate::Millis(millis) => (millis_instant(millis), local),
        AnyDate::Text(s) if s.is_empty() => (None, Zone::Utc),
        AnyDate::Text(s) => text_to_moment(&s, settings),
        AnyDate::Record(record) => record_to_moment(&record, settings)?,
    };
    Ok(DateTime::at(instant, zone, settings.locale_or(locale)))
}

/// Alias of [`DateOnly::from_any`].
pub fn to_date_only(input: impl Into<AnyDate>) -> Result<DateOnly> {
    DateOnly::from_any(input)
}

/// Alias of [`DateTime::from_any`].
pub fn to_date_time(input: impl Into<AnyDate>) -> Result<DateTime> {
    DateTime::from_any(input)
}
