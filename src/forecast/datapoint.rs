//! Met Office DataPoint site forecast schema.
//!
//! Only the fields needed to build [`ForecastSample`]s are modelled:
//!
//! ```text
//! SiteRep.DV.Location.Period[day].Rep[] = { "$": minutes, "S": wind speed, ... }
//! ```
//!
//! DataPoint collapses one-element arrays into bare objects, so `Period`
//! and `Rep` accept either shape.

use serde::Deserialize;

use crate::error::DirectiveError;
use crate::pipeline::types::{DayIndex, ForecastSample, MINUTES_PER_DAY};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "SiteRep")]
    site_rep: SiteRep,
}

#[derive(Debug, Deserialize)]
struct SiteRep {
    #[serde(rename = "DV")]
    dv: DataValues,
}

#[derive(Debug, Deserialize)]
struct DataValues {
    #[serde(rename = "Location")]
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(rename = "Period", default)]
    periods: OneOrMany<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    #[serde(default)]
    value: Option<String>,
    #[serde(rename = "Rep", default)]
    reps: OneOrMany<Rep>,
}

#[derive(Debug, Deserialize)]
struct Rep {
    #[serde(rename = "$")]
    minutes: Scalar,
    #[serde(rename = "S")]
    speed: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// DataPoint encodes numbers as strings; accept bare numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(s) => s.trim().parse().ok(),
            Self::Number(n) => Some(*n),
        }
    }
}

/// Parses a DataPoint payload and returns the samples for `day`.
///
/// A payload without a period for `day` yields an empty vector.
///
/// # Errors
///
/// Returns [`DirectiveError::ForecastFetch`] if the JSON does not match the
/// schema or any report in the selected period is malformed. No partial
/// sample list is ever returned.
pub fn parse_forecast(json: &str, day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError> {
    let envelope: Envelope = serde_json::from_str(json)
        .map_err(|e| DirectiveError::fetch(format!("malformed DataPoint payload: {e}")))?;

    let mut periods = envelope.site_rep.dv.location.periods.into_vec();
    if day.index() >= periods.len() {
        return Ok(Vec::new());
    }
    let period = periods.swap_remove(day.index());
    let label = period.value.as_deref().unwrap_or("?").to_string();

    period
        .reps
        .into_vec()
        .iter()
        .enumerate()
        .map(|(i, rep)| parse_rep(rep).map_err(|msg| {
            DirectiveError::fetch(format!("period {label} report {i}: {msg}"))
        }))
        .collect()
}

fn parse_rep(rep: &Rep) -> Result<ForecastSample, String> {
    let minutes = rep
        .minutes
        .as_f64()
        .ok_or_else(|| "time `$` is not a number".to_string())?;
    if minutes.fract() != 0.0 || minutes < 0.0 || minutes >= f64::from(MINUTES_PER_DAY) {
        return Err(format!("time `$` = {minutes} is outside [0, 1439]"));
    }

    let speed = rep
        .speed
        .as_ref()
        .ok_or_else(|| "missing wind speed `S`".to_string())?
        .as_f64()
        .filter(|s| s.is_finite())
        .ok_or_else(|| "wind speed `S` is not a number".to_string())?;

    Ok(ForecastSample::new(minutes as u32, speed))
}
