use anydate::{DateOnly, DateTime, Duration, FieldRecord, Settings};
use chrono_tz::Tz;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_coerce(c: &mut Criterion) {
    let settings = Settings::new("en", Tz::UTC);

    c.bench_function("date_time_from_iso_string", |b| {
        b.iter(|| DateTime::from_any_with(black_box("2023-09-05T10:15:30.250+02:00"), None, &settings))
    });

    c.bench_function("date_time_from_free_text", |b| {
        b.iter(|| DateTime::from_any_with(black_box("Tue, 05 Sep 2023 10:15:30 GMT"), None, &settings))
    });

    c.bench_function("date_only_from_millis", |b| {
        b.iter(|| DateOnly::from_any_with(black_box(1_693_908_930_250i64), None, &settings))
    });

    c.bench_function("date_time_from_record", |b| {
        b.iter(|| {
            let record = FieldRecord::new()
                .with("year", 2023)
                .with("month", 9)
                .with("day", 5)
                .with("hour", 10)
                .with("timezone", "Europe/Berlin");
            DateTime::from_any_with(black_box(record), None, &settings)
        })
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let settings = Settings::new("en", Tz::UTC);
    let dt = DateTime::from_any_with("2023-01-31T10:15:30Z", None, &settings)
        .unwrap_or_else(|_| DateTime::invalid());
    let berlin = dt.in_timezone("Europe/Berlin");
    let duration = Duration::new().with("months", 1).with("days", 3).with("hours", 5);

    c.bench_function("plus_mixed_duration", |b| {
        b.iter(|| black_box(&berlin).plus_duration(black_box(&duration)))
    });

    c.bench_function("end_of_week", |b| b.iter(|| black_box(&berlin).end_of("week")));

    c.bench_function("to_json", |b| b.iter(|| black_box(&berlin).to_json()));
}

criterion_group!(benches, bench_coerce, bench_arithmetic);
criterion_main!(benches);
