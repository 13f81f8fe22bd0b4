//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use price_series::reference::ReferenceSource;
use price_series::timer::Timer;

/// Quarter hours in a non-leap year.
pub const SAMPLES_PER_YEAR: usize = 96 * 365;

/// Day-ahead fixture in EUR/MWh: the quarter hour of the day times ten, so
/// the loaded value in ct/kWh equals the quarter-hour index within its day.
pub fn day_ahead_raw(i: usize) -> f32 {
    (i % 96) as f32 * 10.0
}

/// CO2 fixture in g/kWh: the sample index itself.
pub fn co2_raw(i: usize) -> f32 {
    i as f32
}

/// Writes a complete set of reference tables into a fresh temporary directory.
///
/// The consumer price table is the packaged one.
pub fn reference_dir() -> (TempDir, ReferenceSource) {
    let dir = tempfile::tempdir().expect("tempdir should be creatable");
    let source = ReferenceSource::in_dir(dir.path());

    write_table(
        &dir.path().join(&source.day_ahead_file),
        "day_ahead_eur_per_mwh",
        (0..SAMPLES_PER_YEAR).map(day_ahead_raw),
    );
    write_table(
        &dir.path().join(&source.co2_file),
        "co2_g_per_kwh",
        (0..SAMPLES_PER_YEAR).map(co2_raw),
    );
    fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join(&source.consumer_price_file),
        dir.path().join(&source.consumer_price_file),
    )
    .expect("packaged consumer prices should be copyable");

    (dir, source)
}

fn write_table(path: &Path, header: &str, values: impl Iterator<Item = f32>) {
    let mut body = String::from(header);
    body.push('\n');
    for v in values {
        writeln!(body, "{v}").expect("writing to a String cannot fail");
    }
    fs::write(path, body).expect("fixture should be writable");
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .expect("valid datetime")
}

/// Timer whose simulation horizon equals `horizon`.
pub fn timer(step_size: u32, horizon: usize, start: NaiveDateTime) -> Timer {
    Timer::new(step_size, horizon, None, None, start).expect("valid timer")
}

pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol,
            "sample {i}: expected {e}, got {a} (tolerance {tol})"
        );
    }
}

/// Records the rendered fields of every WARN event.
#[derive(Clone, Default)]
struct WarnCapture {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut text = FieldText::default();
        event.record(&mut text);
        self.events
            .lock()
            .expect("capture lock should not be poisoned")
            .push(text.0);
    }
}

#[derive(Default)]
struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        if field.name() == "message" {
            write!(self.0, "{value:?}").expect("writing to a String cannot fail");
        } else {
            write!(self.0, "{}={value:?}", field.name()).expect("writing to a String cannot fail");
        }
    }
}

/// Runs `f` under a subscriber that captures WARN events on this thread.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let capture = WarnCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = capture
        .events
        .lock()
        .expect("capture lock should not be poisoned")
        .clone();
    (result, events)
}
