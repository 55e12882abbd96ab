//! Core data types: forecast samples, day selection, and output directives.

use std::fmt;

/// Minutes in one day; valid sample times are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// One forecast reading for a reporting interval.
///
/// # Examples
///
/// ```
/// use windglow::pipeline::types::ForecastSample;
///
/// let s = ForecastSample::new(180, 12.0);
/// assert_eq!(s.time_of_day_minutes, 180);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSample {
    /// Minutes after midnight, in `[0, 1439]`.
    pub time_of_day_minutes: u32,
    /// Wind speed in the provider's unit (mph for DataPoint).
    pub raw_speed: f64,
}

impl ForecastSample {
    /// Creates a sample.
    pub fn new(time_of_day_minutes: u32, raw_speed: f64) -> Self {
        Self {
            time_of_day_minutes,
            raw_speed,
        }
    }
}

/// Which forecast period to read samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayIndex {
    /// The first period in the forecast (current day).
    Today,
    /// The second period (24 hours ahead).
    Tomorrow,
}

impl DayIndex {
    /// Position of this day in the provider's period list.
    pub fn index(self) -> usize {
        match self {
            Self::Today => 0,
            Self::Tomorrow => 1,
        }
    }
}

/// Movement profile for the current-hour directive.
pub const MOVE_PROFILE_CURRENT: u8 = 0;
/// Movement profile for the 24-hour-ahead directive.
pub const MOVE_PROFILE_PREDICTION: u8 = 1;

/// Color blend and movement selector sent to the actuator.
///
/// `red_intensity + green_intensity == 100` for every directive the
/// pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputDirective {
    /// Red channel intensity, `0..=100`.
    pub red_intensity: u8,
    /// Green channel intensity, `0..=100`.
    pub green_intensity: u8,
    /// Movement profile selector.
    pub movement_profile: u8,
}

impl fmt::Display for OutputDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "red={:>3} green={:>3} move_profile={}",
            self.red_intensity, self.green_intensity, self.movement_profile
        )
    }
}
