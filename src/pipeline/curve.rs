//! Turbine power curve lookup.

/// Enercon E-44 power curve (kW), one entry per integer m/s of wind speed.
pub const E44_CURVE_KW: [f64; 30] = [
    0.0, 0.0, 4.0, 20.0, 50.0, 96.0, 156.0, 238.0, 340.0, 466.0, 600.0, 710.0, 790.0, 850.0,
    880.0, 905.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0, 910.0,
    910.0, 910.0, 910.0,
];

/// Rated maximum output of the Tilley turbine (kW).
pub const TILLEY_MAX_OUTPUT_KW: f64 = 910.0;

/// Miles per hour to meters per second.
pub const MPH_TO_MS: f64 = 0.44704;

/// Integer wind-speed index into a [`PowerCurve`].
///
/// Not bounded by any particular curve; [`PowerCurve::lookup`] saturates
/// indices past the last entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WindSpeedBucket(pub usize);

impl WindSpeedBucket {
    /// Converts a raw speed to m/s and rounds to the nearest bucket.
    ///
    /// Negative and non-finite speeds map to bucket 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use windglow::pipeline::curve::{MPH_TO_MS, WindSpeedBucket};
    ///
    /// assert_eq!(WindSpeedBucket::from_speed(10.0, MPH_TO_MS), WindSpeedBucket(4));
    /// assert_eq!(WindSpeedBucket::from_speed(-3.0, MPH_TO_MS), WindSpeedBucket(0));
    /// ```
    pub fn from_speed(raw_speed: f64, to_ms: f64) -> Self {
        let ms = (raw_speed * to_ms).round();
        if !ms.is_finite() || ms <= 0.0 {
            return Self(0);
        }
        Self(ms as usize)
    }
}

/// Fixed mapping from wind-speed bucket to expected power output.
///
/// Immutable once built; share it behind an `Arc` when several requests
/// need it.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCurve {
    points_kw: Vec<f64>,
}

impl PowerCurve {
    /// Builds a curve from per-bucket power values.
    ///
    /// Returns `None` if `points_kw` is empty or holds a negative or
    /// non-finite value.
    pub fn new(points_kw: Vec<f64>) -> Option<Self> {
        if points_kw.is_empty() || points_kw.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return None;
        }
        Some(Self { points_kw })
    }

    /// The built-in Enercon E-44 curve.
    pub fn enercon_e44() -> Self {
        Self {
            points_kw: E44_CURVE_KW.to_vec(),
        }
    }

    /// Number of buckets in the curve (always >= 1).
    pub fn len(&self) -> usize {
        self.points_kw.len()
    }

    /// Always `false`; a curve holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.points_kw.is_empty()
    }

    /// Tabulated power values.
    pub fn points_kw(&self) -> &[f64] {
        &self.points_kw
    }

    /// Returns the power for `bucket`, saturating at the last entry.
    pub fn lookup(&self, bucket: WindSpeedBucket) -> f64 {
        let idx = bucket.0.min(self.points_kw.len() - 1);
        self.points_kw[idx]
    }

    /// `true` if no entry is smaller than the one before it.
    pub fn is_non_decreasing(&self) -> bool {
        self.points_kw.windows(2).all(|w| w[0] <= w[1])
    }
}

impl Default for PowerCurve {
    fn default() -> Self {
        Self::enercon_e44()
    }
}
