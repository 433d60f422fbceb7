//! Comparison predicates over arbitrary inputs.
//!
//! Both sides are coerced to [`DateTime`] and compared by instant. An
//! invalid value on either side makes every predicate `false`.

use std::cmp::Ordering;

use crate::coerce::AnyDate;
use crate::config::Settings;
use crate::date_time::DateTime;
use crate::error::Result;

/// Order two inputs by instant, or `None` when either is invalid.
pub fn compare_with(
    a: impl Into<AnyDate>,
    b: impl Into<AnyDate>,
    settings: &Settings,
) -> Result<Option<Ordering>> {
    let a = DateTime::from_any_with(a, None, settings)?;
    let b = DateTime::from_any_with(b, None, settings)?;
    Ok(a.partial_cmp(&b))
}

fn compare(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<Option<Ordering>> {
    compare_with(a, b, &Settings::current())
}

/// # Examples
///
/// ```
/// use anydate::compare::is_equal;
///
/// assert!(is_equal("2023-09-05T12:00:00+02:00", "2023-09-05T10:00:00Z").unwrap());
/// assert!(!is_equal("garbage", "garbage").unwrap());
/// ```
pub fn is_equal(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<bool> {
    Ok(compare(a, b)? == Some(Ordering::Equal))
}

pub fn is_before(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<bool> {
    Ok(compare(a, b)? == Some(Ordering::Less))
}

pub fn is_after(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<bool> {
    Ok(compare(a, b)? == Some(Ordering::Greater))
}

pub fn is_equal_or_before(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<bool> {
    Ok(matches!(compare(a, b)?, Some(Ordering::Less | Ordering::Equal)))
}

pub fn is_equal_or_after(a: impl Into<AnyDate>, b: impl Into<AnyDate>) -> Result<bool> {
    Ok(matches!(compare(a, b)?, Some(Ordering::Greater | Ordering::Equal)))
}

/// The entry whose instant is furthest in direction `wanted`. Invalid entries
/// are skipped; ties keep the earliest entry.
fn extreme<'a>(
    values: &'a [AnyDate],
    wanted: Ordering,
    settings: &Settings,
) -> Result<Option<&'a AnyDate>> {
    let mut best: Option<(&AnyDate, DateTime)> = None;
    for value in values {
        let coerced = DateTime::from_any_with(value.clone(), None, settings)?;
        if !coerced.is_valid() {
            continue;
        }
        let replace = match &best {
            Some((_, current)) => coerced.partial_cmp(current) == Some(wanted),
            None => true,
        };
        if replace {
            best = Some((value, coerced));
        }
    }
    Ok(best.map(|(value, _)| value))
}

/// The earliest valid entry.
pub fn min(values: &[AnyDate]) -> Result<Option<&AnyDate>> {
    min_with(values, &Settings::current())
}

pub fn min_with<'a>(values: &'a [AnyDate], settings: &Settings) -> Result<Option<&'a AnyDate>> {
    extreme(values, Ordering::Less, settings)
}

/// The latest valid entry.
pub fn max(values: &[AnyDate]) -> Result<Option<&AnyDate>> {
    max_with(values, &Settings::current())
}

pub fn max_with<'a>(values: &'a [AnyDate], settings: &Settings) -> Result<Option<&'a AnyDate>> {
    extreme(values, Ordering::Greater, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::FieldRecord;
    use crate::date_only::DateOnly;
    use chrono_tz::Tz;

    fn settings() -> Settings {
        Settings::new("en", Tz::UTC)
    }

    #[test]
    fn test_predicates_compare_instants() {
        let a = "2023-09-05T12:00:00+02:00";
        let b = "2023-09-05T10:00:01Z";
        assert!(is_before(a, b).unwrap());
        assert!(is_after(b, a).unwrap());
        assert!(is_equal_or_before(a, b).unwrap());
        assert!(is_equal_or_after(a, "2023-09-05T10:00:00Z").unwrap());
        assert!(!is_equal(a, b).unwrap());
    }

    #[test]
    fn test_invalid_is_never_comparable() {
        for other in ["2023-09-05", "", "nope"] {
            assert!(!is_equal("nope", other).unwrap());
            assert!(!is_before("nope", other).unwrap());
            assert!(!is_after("nope", other).unwrap());
            assert!(!is_equal_or_before("nope", other).unwrap());
            assert!(!is_equal_or_after(other, "nope").unwrap());
        }
    }

    #[test]
    fn test_mixed_inputs() {
        let date = DateOnly::from_any_with("2023-09-05", None, &settings()).unwrap();
        assert!(is_equal(&date, "2023-09-05T00:00:00Z").unwrap());
        assert!(is_equal(0, "1970-01-01T00:00:00.000Z").unwrap());
    }

    #[test]
    fn test_record_errors_propagate() {
        let bad = FieldRecord::new().with("year", serde_json::json!({}));
        assert!(is_equal(bad, "2023-09-05").is_err());
    }

    #[test]
    fn test_min_max() {
        let values: Vec<AnyDate> = vec![
            "garbage".into(),
            "2023-09-05T10:00:00Z".into(),
            "2023-09-05T12:00:00+02:00".into(),
            "2021-01-01".into(),
            "2024-01-01".into(),
            AnyDate::Empty,
        ];
        let earliest = min_with(&values, &settings()).unwrap();
        assert!(matches!(earliest, Some(AnyDate::Text(s)) if s == "2021-01-01"));
        let latest = max_with(&values, &settings()).unwrap();
        assert!(matches!(latest, Some(AnyDate::Text(s)) if s == "2024-01-01"));
        // equal instants keep the first entry
        let tied = &values[1..3];
        assert!(matches!(
            min_with(tied, &settings()).unwrap(),
            Some(AnyDate::Text(s)) if s == "2023-09-05T10:00:00Z"
        ));
    }

    #[test]
    fn test_min_of_nothing_valid() {
        let values: Vec<AnyDate> = vec!["x".into(), AnyDate::Empty];
        assert!(min_with(&values, &settings()).unwrap().is_none());
        assert!(max_with(&[], &settings()).unwrap().is_none());
    }
}
