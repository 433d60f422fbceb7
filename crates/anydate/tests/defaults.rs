//! Process-wide defaults. Kept in its own test binary because it mutates
//! global state.

use anydate::{DateOnly, DateTime, Settings};
use chrono_tz::Tz;

#[test]
fn installed_defaults_reach_every_constructor() {
    Settings::new("de", Tz::Asia__Tokyo).install();
    assert_eq!(Settings::current().local_zone, Tz::Asia__Tokyo);

    let dt = DateTime::from_any("2023-09-05T10:00:00").unwrap();
    assert_eq!(dt.locale(), "de");
    assert_eq!(dt.to_json(), "2023-09-05T10:00:00.000Z");

    // naive calendar values are read in the local zone
    let naive = chrono::NaiveDate::from_ymd_opt(2023, 9, 5)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    let dt = DateTime::from_calendar_value(naive);
    assert_eq!(dt.to_json(), "2023-09-05T00:00:00.000Z");
    assert_eq!(dt.timezone().as_deref(), Some("Asia/Tokyo"));

    // de weeks start on Monday
    let d = DateOnly::from_any("2023-09-06").unwrap();
    assert_eq!(d.start_of("week").to_json(), "2023-09-04");

    let overridden = DateOnly::from_any_in_locale("2023-09-06", "en-US").unwrap();
    assert_eq!(overridden.locale(), "en-US");
    assert_eq!(overridden.start_of("week").to_json(), "2023-09-03");
}
