//! Nearest-in-time forecast sample selection.

use crate::error::DirectiveError;

use super::types::ForecastSample;

/// Returns the sample whose time of day is closest to `target_minutes`.
///
/// Ties resolve to the earliest sample in list order.
///
/// # Errors
///
/// Returns [`DirectiveError::NoForecastData`] if `samples` is empty.
///
/// # Examples
///
/// ```
/// use windglow::pipeline::selector::select_nearest;
/// use windglow::pipeline::types::ForecastSample;
///
/// let samples = [ForecastSample::new(0, 5.0), ForecastSample::new(180, 9.0)];
/// let nearest = select_nearest(&samples, 170).unwrap();
/// assert_eq!(nearest.time_of_day_minutes, 180);
/// ```
pub fn select_nearest(
    samples: &[ForecastSample],
    target_minutes: u32,
) -> Result<&ForecastSample, DirectiveError> {
    let (first, rest) = samples
        .split_first()
        .ok_or(DirectiveError::NoForecastData)?;

    let mut nearest = first;
    let mut smallest = first.time_of_day_minutes.abs_diff(target_minutes);
    for sample in rest {
        let delta = sample.time_of_day_minutes.abs_diff(target_minutes);
        if delta < smallest {
            smallest = delta;
            nearest = sample;
        }
    }

    Ok(nearest)
}
