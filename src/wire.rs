//! JSON payloads sent to the actuator.
//!
//! Field names are the contract with deployed clients:
//! - `red_intensity` → `red`
//! - `green_intensity` → `green`
//! - `movement_profile` → `move_profile`

use serde::{Deserialize, Serialize};

use crate::error::DirectiveError;
use crate::pipeline::mapper::CurveRow;
use crate::pipeline::types::OutputDirective;

/// Successful directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveResponse {
    /// Red intensity, 0..=100.
    pub red: u8,
    /// Green intensity, 0..=100.
    pub green: u8,
    /// Movement profile selector.
    pub move_profile: u8,
}

impl From<&OutputDirective> for DirectiveResponse {
    fn from(d: &OutputDirective) -> Self {
        Self {
            red: d.red_intensity,
            green: d.green_intensity,
            move_profile: d.movement_profile,
        }
    }
}

/// Error reported on the same channel as a directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Operation name as requested by the client.
    pub function: String,
    /// Human-readable message.
    pub msg: String,
}

/// Either payload; serialized without a tag so clients see the bare object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectivePayload {
    /// A computed directive.
    Directive(DirectiveResponse),
    /// A reportable failure.
    Error(ErrorPayload),
}

impl DirectivePayload {
    /// Builds the payload for a request named `function`.
    pub fn from_result(function: &str, result: Result<OutputDirective, DirectiveError>) -> Self {
        match result {
            Ok(d) => Self::Directive(DirectiveResponse::from(&d)),
            Err(e) => Self::Error(ErrorPayload {
                function: function.to_string(),
                msg: e.to_string(),
            }),
        }
    }

    /// `true` for the error variant.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One row of the curve response table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    /// Curve index.
    pub bucket: usize,
    /// Wind speed (m/s) the bucket stands for.
    pub speed_ms: f64,
    /// Tabulated power (kW).
    pub power_kw: f64,
    /// Red intensity at this speed.
    pub red: u8,
    /// Green intensity at this speed.
    pub green: u8,
}

impl From<&CurveRow> for CurveRecord {
    fn from(r: &CurveRow) -> Self {
        Self {
            bucket: r.bucket,
            speed_ms: r.bucket as f64,
            power_kw: r.power_kw,
            red: r.red,
            green: r.green,
        }
    }
}
