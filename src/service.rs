//! Operation dispatch: forecast fetch, selection, mapping, telemetry.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Timelike;
use rand::Rng;
use tracing::{info, warn};

use crate::error::DirectiveError;
use crate::forecast::ForecastProvider;
use crate::pipeline::mapper::OutputMapper;
use crate::pipeline::selector::select_nearest;
use crate::pipeline::types::{
    DayIndex, MOVE_PROFILE_CURRENT, MOVE_PROFILE_PREDICTION, OutputDirective,
};
use crate::telemetry::{TelemetryEvent, TelemetryNotifier};

/// Highest movement profile the test-data path picks.
pub const MAX_TEST_MOVE_PROFILE: u8 = 2;

/// Requests the actuator can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Directive for the current hour from today's forecast.
    CurrentHour,
    /// Directive for the same hour tomorrow; also reported to telemetry.
    Prediction24h,
    /// Random directive, independent of any forecast.
    TestData,
}

impl Operation {
    /// All operations, in wire-name order.
    pub const ALL: [Operation; 3] = [Self::CurrentHour, Self::Prediction24h, Self::TestData];

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentHour => "current_hour",
            Self::Prediction24h => "24hour_prediction",
            Self::TestData => "test_data",
        }
    }

    /// Forecast period the operation reads, if any.
    pub fn day(self) -> Option<DayIndex> {
        match self {
            Self::CurrentHour => Some(DayIndex::Today),
            Self::Prediction24h => Some(DayIndex::Tomorrow),
            Self::TestData => None,
        }
    }

    /// Movement profile attached to forecast-derived directives.
    pub fn movement_profile(self) -> Option<u8> {
        match self {
            Self::CurrentHour => Some(MOVE_PROFILE_CURRENT),
            Self::Prediction24h => Some(MOVE_PROFILE_PREDICTION),
            Self::TestData => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DirectiveError;

    /// Accepts the canonical names plus the legacy `get_`-prefixed ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_hour" | "get_current_hour" => Ok(Self::CurrentHour),
            "24hour_prediction" | "get_24hour_prediction" => Ok(Self::Prediction24h),
            "test_data" => Ok(Self::TestData),
            other => Err(DirectiveError::UnknownRequest {
                name: other.to_string(),
            }),
        }
    }
}

/// Where the target hour comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourSource {
    /// Local wall clock.
    #[default]
    System,
    /// A fixed hour in `0..24`.
    Fixed(u32),
}

impl HourSource {
    /// Hour of day in `0..24`.
    pub fn hour(self) -> u32 {
        match self {
            Self::System => chrono::Local::now().hour(),
            Self::Fixed(h) => h % 24,
        }
    }

    /// Target time for sample selection, in minutes after midnight.
    pub fn target_minutes(self) -> u32 {
        self.hour() * 60
    }
}

/// Uniformly random complementary colors and movement profile.
pub fn random_directive<R: Rng>(rng: &mut R) -> OutputDirective {
    let red = rng.random_range(0..=100u8);
    OutputDirective {
        red_intensity: red,
        green_intensity: 100 - red,
        movement_profile: rng.random_range(0..=MAX_TEST_MOVE_PROFILE),
    }
}

fn test_data() -> OutputDirective {
    random_directive(&mut rand::rng())
}

/// Runs operations against a forecast provider and an output mapper.
///
/// Holds only immutable state, so one instance behind an `Arc` serves
/// concurrent requests.
pub struct DirectiveService {
    provider: Arc<dyn ForecastProvider>,
    mapper: OutputMapper,
    notifier: TelemetryNotifier,
    clock: HourSource,
}

impl DirectiveService {
    /// Creates a service with telemetry disabled and the system clock.
    pub fn new(provider: Arc<dyn ForecastProvider>, mapper: OutputMapper) -> Self {
        Self {
            provider,
            mapper,
            notifier: TelemetryNotifier::disabled(),
            clock: HourSource::System,
        }
    }

    /// Replaces the telemetry notifier.
    pub fn with_notifier(mut self, notifier: TelemetryNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the hour source.
    pub fn with_clock(mut self, clock: HourSource) -> Self {
        self.clock = clock;
        self
    }

    /// The mapper used for forecast-derived directives.
    pub fn mapper(&self) -> &OutputMapper {
        &self.mapper
    }

    /// Produces the directive for `operation`.
    ///
    /// For [`Operation::Prediction24h`] a telemetry event is queued after the
    /// directive is computed; delivery is not awaited.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::ForecastFetch`] if the provider fails and
    /// [`DirectiveError::NoForecastData`] if the requested day has no samples.
    pub async fn handle(&self, operation: Operation) -> Result<OutputDirective, DirectiveError> {
        let (Some(day), Some(profile)) = (operation.day(), operation.movement_profile()) else {
            let directive = test_data();
            info!(%operation, %directive, "test directive");
            return Ok(directive);
        };

        let target = self.clock.target_minutes();
        let directive = self
            .forecast_directive(day, target, profile)
            .await
            .inspect_err(|e| warn!(%operation, error = %e, "no directive"))?;
        info!(%operation, target_minutes = target, %directive, "forecast directive");

        if operation == Operation::Prediction24h {
            self.notifier.notify(TelemetryEvent {
                operation,
                directive,
            });
        }
        Ok(directive)
    }

    /// Fetches `day`, picks the sample nearest `target_minutes`, and maps it.
    ///
    /// # Errors
    ///
    /// See [`DirectiveService::handle`].
    pub async fn forecast_directive(
        &self,
        day: DayIndex,
        target_minutes: u32,
        movement_profile: u8,
    ) -> Result<OutputDirective, DirectiveError> {
        let samples = self.provider.fetch_day(day).await?;
        let sample = select_nearest(&samples, target_minutes)?;
        tracing::debug!(
            provider = self.provider.name(),
            sample_minutes = sample.time_of_day_minutes,
            raw_speed = sample.raw_speed,
            bucket = self.mapper.bucket_for(sample.raw_speed).0,
            "selected forecast sample"
        );
        Ok(self.mapper.map(sample, movement_profile))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc;

    use super::*;
    use crate::forecast::{FailingForecastProvider, StaticForecastProvider};
    use crate::pipeline::types::ForecastSample;
    use crate::telemetry::TELEMETRY_QUEUE_CAPACITY;

    fn provider() -> Arc<dyn ForecastProvider> {
        Arc::new(
            StaticForecastProvider::new()
                .with_day(
                    DayIndex::Today,
                    vec![ForecastSample::new(0, 0.0), ForecastSample::new(180, 10.0)],
                )
                .with_day(DayIndex::Tomorrow, vec![ForecastSample::new(180, 34.0)]),
        )
    }

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>(), Ok(op));
        }
        assert_eq!(
            "get_24hour_prediction".parse::<Operation>(),
            Ok(Operation::Prediction24h)
        );
        assert_eq!(
            "get_current_hour".parse::<Operation>(),
            Ok(Operation::CurrentHour)
        );
    }

    #[test]
    fn unknown_operation_rejected() {
        assert_eq!(
            "log_datarium".parse::<Operation>(),
            Err(DirectiveError::UnknownRequest {
                name: "log_datarium".into()
            })
        );
    }

    #[test]
    fn fixed_hour_wraps() {
        assert_eq!(HourSource::Fixed(3).target_minutes(), 180);
        assert_eq!(HourSource::Fixed(25).hour(), 1);
        assert!(HourSource::System.hour() < 24);
    }

    #[test]
    fn random_directive_is_complementary_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let d = random_directive(&mut rng);
            assert_eq!(
                u32::from(d.red_intensity) + u32::from(d.green_intensity),
                100
            );
            assert!(d.movement_profile <= MAX_TEST_MOVE_PROFILE);
        }
    }

    #[tokio::test]
    async fn current_hour_uses_today_and_profile_zero() {
        let service = DirectiveService::new(provider(), OutputMapper::default())
            .with_clock(HourSource::Fixed(3));
        let d = service.handle(Operation::CurrentHour).await.unwrap();
        assert_eq!(
            d,
            OutputDirective {
                red_intensity: 84,
                green_intensity: 16,
                movement_profile: 0,
            }
        );
    }

    #[tokio::test]
    async fn prediction_uses_tomorrow_and_notifies() {
        let (tx, mut rx) = mpsc::channel(TELEMETRY_QUEUE_CAPACITY);
        let service = DirectiveService::new(provider(), OutputMapper::default())
            .with_clock(HourSource::Fixed(3))
            .with_notifier(TelemetryNotifier::from_sender(tx));

        let d = service.handle(Operation::Prediction24h).await.unwrap();
        assert_eq!((d.red_intensity, d.green_intensity, d.movement_profile), (0, 100, 1));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.operation, Operation::Prediction24h);
        assert_eq!(event.directive, d);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn current_hour_does_not_notify() {
        let (tx, mut rx) = mpsc::channel(TELEMETRY_QUEUE_CAPACITY);
        let service = DirectiveService::new(provider(), OutputMapper::default())
            .with_clock(HourSource::Fixed(12))
            .with_notifier(TelemetryNotifier::from_sender(tx));
        service.handle(Operation::CurrentHour).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_day_is_no_forecast_data() {
        let service = DirectiveService::new(
            Arc::new(StaticForecastProvider::new()),
            OutputMapper::default(),
        );
        assert_eq!(
            service.handle(Operation::CurrentHour).await,
            Err(DirectiveError::NoForecastData)
        );
    }

    #[tokio::test]
    async fn fetch_failure_propagates_and_skips_telemetry() {
        let (tx, mut rx) = mpsc::channel(TELEMETRY_QUEUE_CAPACITY);
        let service = DirectiveService::new(
            Arc::new(FailingForecastProvider::new("timeout")),
            OutputMapper::default(),
        )
        .with_notifier(TelemetryNotifier::from_sender(tx));
        let err = service.handle(Operation::Prediction24h).await.unwrap_err();
        assert!(matches!(err, DirectiveError::ForecastFetch { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_data_ignores_provider() {
        let service = DirectiveService::new(
            Arc::new(FailingForecastProvider::new("unused")),
            OutputMapper::default(),
        );
        let d = service.handle(Operation::TestData).await.unwrap();
        assert_eq!(
            u32::from(d.red_intensity) + u32::from(d.green_intensity),
            100
        );
    }
}
