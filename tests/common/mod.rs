//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use windglow::config::ServiceConfig;
use windglow::forecast::{FileForecastProvider, ForecastProvider};
use windglow::service::{DirectiveService, HourSource};
use windglow::telemetry::{TELEMETRY_QUEUE_CAPACITY, TelemetryEvent, TelemetryNotifier};

/// Path to the two-day Tiree DataPoint forecast.
pub fn tiree_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/datapoint_tiree.json")
}

/// File provider over the Tiree fixture.
pub fn tiree_provider() -> Arc<dyn ForecastProvider> {
    Arc::new(FileForecastProvider::new(tiree_fixture()))
}

/// Service over `provider` with the default E-44/Tilley mapping, a fixed
/// hour, and telemetry captured in the returned receiver.
pub fn service_at_hour(
    provider: Arc<dyn ForecastProvider>,
    hour: u32,
) -> (DirectiveService, mpsc::Receiver<TelemetryEvent>) {
    let mapper = ServiceConfig::default()
        .output_mapper()
        .expect("default config builds a mapper");
    let (tx, rx) = mpsc::channel(TELEMETRY_QUEUE_CAPACITY);
    let service = DirectiveService::new(provider, mapper)
        .with_clock(HourSource::Fixed(hour))
        .with_notifier(TelemetryNotifier::from_sender(tx));
    (service, rx)
}
