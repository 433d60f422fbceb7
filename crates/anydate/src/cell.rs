//! A named, mutable slot for a date value.
//!
//! Value types never change in place. Model layers that need an assignable
//! attribute wrap one in a [`DateCell`], which coerces on write and, in
//! strict mode, rejects anything that is not already a valid instance.

use crate::coerce::AnyDate;
use crate::config::Settings;
use crate::date_only::DateOnly;
use crate::date_time::DateTime;
use crate::error::{AnyDateError, Result};

/// A field addressable through [`DateCell::set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Week,
    IsoWeek,
    Quarter,
    Weekday,
    DayOfYear,
}

/// A value type a [`DateCell`] can hold.
pub trait CellValue: Clone {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    fn coerce(input: AnyDate, settings: &Settings) -> Result<Self>;

    /// The input as an instance of this type, without coercion.
    fn instance(input: AnyDate) -> Option<Self>;

    fn is_valid(&self) -> bool;

    /// Builder for `field`. Fields the type does not have leave it unchanged.
    fn with_field(&self, field: Field, value: i64) -> Self;
}

impl CellValue for DateOnly {
    const TYPE_NAME: &'static str = "DateOnly";

    fn coerce(input: AnyDate, settings: &Settings) -> Result<Self> {
        DateOnly::from_any_with(input, None, settings)
    }

    fn instance(input: AnyDate) -> Option<Self> {
        match input {
            AnyDate::DateOnly(value) => Some(value),
            _ => None,
        }
    }

    fn is_valid(&self) -> bool {
        DateOnly::is_valid(self)
    }

    fn with_field(&self, field: Field, value: i64) -> Self {
        match field {
            Field::Year => self.with_year(value),
            Field::Month => self.with_month(value),
            Field::Day => self.with_day(value),
            Field::Week => self.with_week(value),
            Field::IsoWeek => self.with_iso_week(value),
            Field::Quarter => self.with_quarter(value),
            Field::Weekday => self.with_weekday(value),
            Field::DayOfYear => self.with_day_of_year(value),
            Field::Hour | Field::Minute | Field::Second | Field::Millisecond => self.clone(),
        }
    }
}

impl CellValue for DateTime {
    const TYPE_NAME: &'static str = "DateTime";

    fn coerce(input: AnyDate, settings: &Settings) -> Result<Self> {
        DateTime::from_any_with(input, None, settings)
    }

    fn instance(input: AnyDate) -> Option<Self> {
        match input {
            AnyDate::DateTime(value) => Some(value),
            _ => None,
        }
    }

    fn is_valid(&self) -> bool {
        DateTime::is_valid(self)
    }

    fn with_field(&self, field: Field, value: i64) -> Self {
        match field {
            Field::Year => self.with_year(value),
            Field::Month => self.with_month(value),
            Field::Day => self.with_day(value),
            Field::Hour => self.with_hour(value),
            Field::Minute => self.with_minute(value),
            Field::Second => self.with_second(value),
            Field::Millisecond => self.with_millisecond(value),
            Field::Week => self.with_week(value),
            Field::IsoWeek => self.with_iso_week(value),
            Field::Quarter => self.with_quarter(value),
            Field::Weekday => self.with_weekday(value),
            Field::DayOfYear => self.with_day_of_year(value),
        }
    }
}

/// A named, optional, assignable date value.
///
/// # Examples
///
/// ```
/// use anydate::{DateCell, DateOnly, Field};
///
/// let mut birthday = DateCell::<DateOnly>::new("birthday");
/// birthday.set("1990-05-17").unwrap();
/// birthday.set_field(Field::Year, 1991);
/// assert_eq!(birthday.get().unwrap().to_json(), "1991-05-17");
///
/// let mut strict = DateCell::<DateOnly>::new("birthday").strict();
/// let err = strict.set("1990-05-17").unwrap_err();
/// assert_eq!(err.to_string(), "Expected a DateOnly value for \"birthday\"");
/// ```
#[derive(Debug, Clone)]
pub struct DateCell<T> {
    field: String,
    value: Option<T>,
    strict: bool,
}

impl<T: CellValue> DateCell<T> {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: None,
            strict: false,
        }
    }

    /// Only accept valid instances of `T` (or an empty input, which clears).
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn set(&mut self, input: impl Into<AnyDate>) -> Result<()> {
        self.set_with(input, &Settings::current())
    }

    /// Assign `input`, coercing with `settings` in non-strict mode.
    pub fn set_with(&mut self, input: impl Into<AnyDate>, settings: &Settings) -> Result<()> {
        let input = input.into();
        if matches!(input, AnyDate::Empty) {
            self.value = None;
            return Ok(());
        }
        let value = if self.strict {
            let value = T::instance(input).ok_or_else(|| AnyDateError::UnexpectedValueType {
                expected: T::TYPE_NAME,
                field: self.field.clone(),
            })?;
            if !value.is_valid() {
                return Err(AnyDateError::InvalidAssignment {
                    field: self.field.clone(),
                });
            }
            value
        } else {
            T::coerce(input, settings)?
        };
        tracing::trace!(field = %self.field, "date cell assigned");
        self.value = Some(value);
        Ok(())
    }

    /// In-place counterpart of the `with_*` builders. An empty cell stays
    /// empty.
    pub fn set_field(&mut self, field: Field, value: i64) {
        if let Some(current) = &self.value {
            self.value = Some(current.with_field(field, value));
        }
    }
}
