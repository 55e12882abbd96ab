//! Wind forecast to actuator color/movement directives.
//!
//! A forecast provider supplies per-day wind-speed samples; the pipeline
//! picks the sample nearest the target hour, looks expected turbine power up
//! in a fixed curve, and turns it into a red/green blend plus a movement
//! profile for the display controller.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
/// Curve lookup, sample selection, and directive mapping.
pub mod pipeline;
pub mod service;
pub mod telemetry;
pub mod wire;
