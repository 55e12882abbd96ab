//! Forecast-to-directive pipeline: curve lookup, sample selection, mapping.

/// Turbine power curve and wind-speed buckets.
pub mod curve;
/// Directive derivation from a selected sample.
pub mod mapper;
/// Nearest-in-time sample selection.
pub mod selector;
pub mod types;

pub use curve::{PowerCurve, WindSpeedBucket};
pub use mapper::OutputMapper;
pub use selector::select_nearest;
pub use types::{DayIndex, ForecastSample, OutputDirective};
