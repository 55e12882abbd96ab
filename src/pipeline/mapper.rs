//! Forecast sample to color/movement directive mapping.

use super::curve::{MPH_TO_MS, PowerCurve, TILLEY_MAX_OUTPUT_KW, WindSpeedBucket};
use super::types::{ForecastSample, OutputDirective};

/// Green share multiplier. Green LEDs look dimmer than red ones at the same
/// drive level, so the green share is amplified before clamping.
pub const DEFAULT_GREEN_SKEW: f64 = 3.0;

/// Converts forecast samples into directives for one turbine model.
///
/// # Examples
///
/// ```
/// use windglow::pipeline::mapper::OutputMapper;
/// use windglow::pipeline::types::ForecastSample;
///
/// let mapper = OutputMapper::default();
/// let d = mapper.map(&ForecastSample::new(0, 10.0), 0);
/// assert_eq!((d.red_intensity, d.green_intensity), (84, 16));
/// ```
#[derive(Debug, Clone)]
pub struct OutputMapper {
    curve: PowerCurve,
    max_output_kw: f64,
    speed_to_ms: f64,
    green_skew: f64,
}

impl OutputMapper {
    /// Creates a mapper.
    ///
    /// # Arguments
    ///
    /// * `curve` - Power curve of the turbine model
    /// * `max_output_kw` - Rated maximum used as the normalization denominator (must be > 0)
    /// * `speed_to_ms` - Factor converting raw forecast speed to m/s
    /// * `green_skew` - Multiplier applied to the green percentage before clamping
    ///
    /// # Panics
    ///
    /// Panics if `max_output_kw` is not strictly positive.
    pub fn new(curve: PowerCurve, max_output_kw: f64, speed_to_ms: f64, green_skew: f64) -> Self {
        assert!(max_output_kw > 0.0, "max_output_kw must be > 0");
        Self {
            curve,
            max_output_kw,
            speed_to_ms,
            green_skew,
        }
    }

    /// The curve this mapper looks power up in.
    pub fn curve(&self) -> &PowerCurve {
        &self.curve
    }

    /// Bucket for a raw forecast speed.
    pub fn bucket_for(&self, raw_speed: f64) -> WindSpeedBucket {
        WindSpeedBucket::from_speed(raw_speed, self.speed_to_ms)
    }

    /// Skewed green percentage for a bucket, clamped to `[0, 100]`.
    pub fn green_percent(&self, bucket: WindSpeedBucket) -> f64 {
        let power = self.curve.lookup(bucket);
        let percent = power / self.max_output_kw * 100.0 * self.green_skew;
        percent.min(100.0)
    }

    /// Directive for a bucket with the given movement profile.
    pub fn directive_for_bucket(
        &self,
        bucket: WindSpeedBucket,
        movement_profile: u8,
    ) -> OutputDirective {
        let green = self.green_percent(bucket).round().clamp(0.0, 100.0) as u8;
        OutputDirective {
            red_intensity: 100 - green,
            green_intensity: green,
            movement_profile,
        }
    }

    /// Maps a forecast sample to a directive.
    pub fn map(&self, sample: &ForecastSample, movement_profile: u8) -> OutputDirective {
        self.directive_for_bucket(self.bucket_for(sample.raw_speed), movement_profile)
    }

    /// One row per curve bucket: the colors each wind speed produces.
    pub fn response_table(&self) -> Vec<CurveRow> {
        (0..self.curve.len())
            .map(|i| {
                let bucket = WindSpeedBucket(i);
                let d = self.directive_for_bucket(bucket, 0);
                CurveRow {
                    bucket: i,
                    power_kw: self.curve.lookup(bucket),
                    green_percent: self.green_percent(bucket),
                    red: d.red_intensity,
                    green: d.green_intensity,
                }
            })
            .collect()
    }
}

/// Mapper output for a single wind-speed bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRow {
    /// Wind speed bucket (m/s).
    pub bucket: usize,
    /// Tabulated power (kW).
    pub power_kw: f64,
    /// Skewed, clamped green percentage before rounding.
    pub green_percent: f64,
    /// Red intensity.
    pub red: u8,
    /// Green intensity.
    pub green: u8,
}

impl Default for OutputMapper {
    fn default() -> Self {
        Self::new(
            PowerCurve::enercon_e44(),
            TILLEY_MAX_OUTPUT_KW,
            MPH_TO_MS,
            DEFAULT_GREEN_SKEW,
        )
    }
}

/// Maps a sample with the default mph conversion and green skew.
///
/// # Panics
///
/// Panics if `max_output_kw` is not strictly positive.
pub fn map_to_directive(
    sample: &ForecastSample,
    curve: &PowerCurve,
    max_output_kw: f64,
    movement_profile: u8,
) -> OutputDirective {
    OutputMapper::new(curve.clone(), max_output_kw, MPH_TO_MS, DEFAULT_GREEN_SKEW)
        .map(sample, movement_profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_ten_mph() {
        // 10 mph -> 4 m/s -> 50 kW -> 5.49% -> 16.48% skewed
        let d = map_to_directive(
            &ForecastSample::new(0, 10.0),
            &PowerCurve::enercon_e44(),
            TILLEY_MAX_OUTPUT_KW,
            0,
        );
        assert_eq!(d.red_intensity, 84);
        assert_eq!(d.green_intensity, 16);
        assert_eq!(d.movement_profile, 0);
    }

    #[test]
    fn bucket_fifteen_saturates_green() {
        let mapper = OutputMapper::default();
        let d = mapper.directive_for_bucket(WindSpeedBucket(15), 1);
        assert_eq!(d.red_intensity, 0);
        assert_eq!(d.green_intensity, 100);
        assert_eq!(d.movement_profile, 1);
    }

    #[test]
    fn calm_is_all_red() {
        let d = OutputMapper::default().map(&ForecastSample::new(0, 0.0), 0);
        assert_eq!((d.red_intensity, d.green_intensity), (100, 0));
    }

    #[test]
    fn storm_past_curve_end_is_all_green() {
        let d = OutputMapper::default().map(&ForecastSample::new(0, 200.0), 0);
        assert_eq!((d.red_intensity, d.green_intensity), (0, 100));
    }

    #[test]
    fn half_percent_stays_complementary() {
        // 1.25 / 10 * 100 = 12.5 exactly
        let curve = PowerCurve::new(vec![1.25]).unwrap();
        let mapper = OutputMapper::new(curve, 10.0, 1.0, 1.0);
        let d = mapper.map(&ForecastSample::new(0, 0.0), 0);
        assert_eq!(d.green_intensity, 13);
        assert_eq!(d.red_intensity, 87);
    }

    #[test]
    fn skew_of_one_is_plain_percentage() {
        let mapper = OutputMapper::new(PowerCurve::enercon_e44(), 910.0, MPH_TO_MS, 1.0);
        // bucket 10 -> 600 kW -> 65.9%
        let d = mapper.directive_for_bucket(WindSpeedBucket(10), 0);
        assert_eq!(d.green_intensity, 66);
        assert_eq!(d.red_intensity, 34);
    }

    #[test]
    fn response_table_covers_every_bucket() {
        let table = OutputMapper::default().response_table();
        assert_eq!(table.len(), 30);
        assert_eq!(table[4].power_kw, 50.0);
        assert_eq!((table[4].red, table[4].green), (84, 16));
        assert!(table.iter().all(|r| u32::from(r.red) + u32::from(r.green) == 100));
        assert!(table.windows(2).all(|w| w[0].green <= w[1].green));
    }

    #[test]
    #[should_panic(expected = "max_output_kw must be > 0")]
    fn zero_max_output_panics() {
        OutputMapper::new(PowerCurve::enercon_e44(), 0.0, MPH_TO_MS, 3.0);
    }
}
