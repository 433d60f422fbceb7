//! # anydate
//!
//! Date-only and date-time value types with a universal coercion engine.
//!
//! Inputs arrive in every shape: chrono values, system times, ISO strings,
//! epoch milliseconds, object notation, free-form JSON. [`DateOnly::from_any`]
//! and [`DateTime::from_any`] turn any of them into one of two immutable
//! value types that keep their offset, zone and locale metadata, support
//! unit-aware arithmetic, and degrade to an invalid value instead of failing
//! on input they cannot read.
//!
//! ## Modules
//!
//! - [`date_only`]: calendar dates anchored at UTC midnight
//! - [`date_time`]: instants with an offset and an optional zone name
//! - [`coerce`]: [`AnyDate`] input dispatch, object notation
//! - [`compare`]: instant comparison over arbitrary inputs, `min`/`max`
//! - [`cell`]: mutable named slot for model layers
//! - [`grammar`]: recognized string grammars and `is_*` predicates
//! - [`units`]: unit tokens and durations
//! - [`config`]: process-wide defaults and locale week rules
//! - [`error`]: Error types

mod calendar;
pub mod cell;
pub mod coerce;
pub mod compare;
pub mod config;
pub mod date_only;
pub mod date_time;
pub mod error;
mod format;
pub mod grammar;
mod native;
pub mod units;
mod zone;

pub use cell::{CellValue, DateCell, Field};
pub use coerce::{to_date_only, to_date_time, AnyDate, CalendarValue, FieldRecord, FieldValue};
pub use config::{Settings, WeekRules, WeekStartDay, DEFAULT_LOCALE};
pub use date_only::{DateOnly, DateOnlyObject, INVALID_DATE};
pub use date_time::{DateTime, DateTimeObject};
pub use error::{AnyDateError, Result};
pub use grammar::{is_any_date, is_date_only, is_date_time, Grammar};
pub use units::{Duration, Unit};
