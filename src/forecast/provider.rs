//! Forecast providers: DataPoint over HTTP, local file, and in-memory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::DirectiveError;
use crate::pipeline::types::{DayIndex, ForecastSample};

use super::datapoint::parse_forecast;

/// Source of per-day forecast samples.
///
/// Implementations must either return fully parsed samples or an error;
/// failures surface as [`DirectiveError::ForecastFetch`] and an absent day
/// as an empty vector.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetches the samples for `day`.
    async fn fetch_day(&self, day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Met Office DataPoint site forecast fetched over HTTP.
pub struct DataPointProvider {
    client: reqwest::Client,
    url: String,
    resolution: String,
    api_key: String,
}

impl DataPointProvider {
    /// Builds a provider from its configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::ForecastFetch`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, DirectiveError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DirectiveError::fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.location_id
            ),
            resolution: config.resolution.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resource URL without query parameters (the API key is never logged).
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ForecastProvider for DataPointProvider {
    async fn fetch_day(&self, day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError> {
        debug!(url = %self.url, ?day, "fetching DataPoint forecast");
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("res", self.resolution.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DirectiveError::fetch(e.without_url()))?
            .error_for_status()
            .map_err(|e| DirectiveError::fetch(e.without_url()))?;

        let body = response
            .text()
            .await
            .map_err(|e| DirectiveError::fetch(e.without_url()))?;
        let samples = parse_forecast(&body, day)?;
        debug!(count = samples.len(), ?day, "parsed DataPoint samples");
        Ok(samples)
    }

    fn name(&self) -> &'static str {
        "datapoint"
    }
}

/// DataPoint-format forecast read from a local JSON file on every request.
pub struct FileForecastProvider {
    path: PathBuf,
}

impl FileForecastProvider {
    /// Creates a provider reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "using file forecast provider");
        Self { path }
    }
}

#[async_trait]
impl ForecastProvider for FileForecastProvider {
    async fn fetch_day(&self, day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DirectiveError::fetch(format!("cannot read \"{}\": {e}", self.path.display()))
        })?;
        parse_forecast(&body, day)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Fixed in-memory samples per day.
///
/// # Examples
///
/// ```
/// use windglow::forecast::StaticForecastProvider;
/// use windglow::pipeline::types::{DayIndex, ForecastSample};
///
/// let provider = StaticForecastProvider::new()
///     .with_day(DayIndex::Today, vec![ForecastSample::new(0, 10.0)]);
/// assert_eq!(provider.samples(DayIndex::Today).len(), 1);
/// assert!(provider.samples(DayIndex::Tomorrow).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticForecastProvider {
    days: HashMap<DayIndex, Vec<ForecastSample>>,
}

impl StaticForecastProvider {
    /// Creates a provider with no data for any day.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the samples returned for `day`.
    pub fn with_day(mut self, day: DayIndex, samples: Vec<ForecastSample>) -> Self {
        self.days.insert(day, samples);
        self
    }

    /// Samples configured for `day` (empty if none).
    pub fn samples(&self, day: DayIndex) -> &[ForecastSample] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }
}

#[async_trait]
impl ForecastProvider for StaticForecastProvider {
    async fn fetch_day(&self, day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError> {
        Ok(self.samples(day).to_vec())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Provider that always fails; stands in for an unreachable upstream.
#[derive(Debug, Clone)]
pub struct FailingForecastProvider {
    message: String,
}

impl FailingForecastProvider {
    /// Creates a provider failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ForecastProvider for FailingForecastProvider {
    async fn fetch_day(&self, _day: DayIndex) -> Result<Vec<ForecastSample>, DirectiveError> {
        Err(DirectiveError::fetch(&self.message))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
