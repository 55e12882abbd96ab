//! Forecast sources feeding the pipeline.

/// DataPoint JSON schema parsing.
pub mod datapoint;
pub mod provider;

pub use datapoint::parse_forecast;
pub use provider::{
    DataPointProvider, FailingForecastProvider, FileForecastProvider, ForecastProvider,
    StaticForecastProvider,
};
