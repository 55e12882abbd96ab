//! TOML-based service configuration.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::pipeline::curve::{E44_CURVE_KW, MPH_TO_MS, PowerCurve, TILLEY_MAX_OUTPUT_KW};
use crate::pipeline::mapper::{DEFAULT_GREEN_SKEW, OutputMapper};

/// Top-level service configuration parsed from TOML.
///
/// Every section has defaults matching the Tilley/E-44 installation, so an
/// empty file is a valid configuration apart from the DataPoint location
/// and API key. Load with [`ServiceConfig::from_toml_file`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Forecast source parameters.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Turbine power curve and rating.
    #[serde(default)]
    pub turbine: TurbineConfig,
    /// Speed conversion and color skew.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Remote telemetry endpoint.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// HTTP server parameters.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Met Office DataPoint site forecast parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the site-specific forecast resource.
    pub base_url: String,
    /// DataPoint location id.
    pub location_id: String,
    /// DataPoint API key.
    pub api_key: String,
    /// Forecast resolution, e.g. `"3hourly"`.
    pub resolution: String,
    /// HTTP request timeout in seconds (must be > 0).
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://datapoint.metoffice.gov.uk/public/data/val/wxfcs/all/json".to_string(),
            location_id: String::new(),
            api_key: String::new(),
            resolution: "3hourly".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Turbine power curve and rated output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurbineConfig {
    /// Power (kW) per integer m/s of wind speed, starting at 0 m/s.
    pub curve: Vec<f64>,
    /// Rated maximum output (kW), used to normalize the curve.
    pub max_output_kw: f64,
}

impl Default for TurbineConfig {
    fn default() -> Self {
        Self {
            curve: E44_CURVE_KW.to_vec(),
            max_output_kw: TILLEY_MAX_OUTPUT_KW,
        }
    }
}

/// Speed conversion and perceptual skew.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Factor converting forecast speed to m/s (mph by default).
    pub speed_to_ms: f64,
    /// Multiplier applied to the green percentage before clamping.
    pub green_skew: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            speed_to_ms: MPH_TO_MS,
            green_skew: DEFAULT_GREEN_SKEW,
        }
    }
}

/// Remote telemetry endpoint hit after each 24-hour prediction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Endpoint URL; telemetry is disabled when absent.
    pub endpoint: Option<String>,
}

/// HTTP server parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind (must be != 0).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"turbine.max_output_kw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ServiceConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. DataPoint
    /// credentials are not checked here since offline providers do not
    /// need them; see [`ServiceConfig::validate_datapoint`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.provider.timeout_secs == 0 {
            errors.push(ConfigError::new("provider.timeout_secs", "must be > 0"));
        }

        let t = &self.turbine;
        if t.curve.is_empty() {
            errors.push(ConfigError::new("turbine.curve", "must not be empty"));
        } else if t.curve.iter().any(|p| !p.is_finite() || *p < 0.0) {
            errors.push(ConfigError::new(
                "turbine.curve",
                "entries must be finite and >= 0",
            ));
        }
        if !(t.max_output_kw.is_finite() && t.max_output_kw > 0.0) {
            errors.push(ConfigError::new("turbine.max_output_kw", "must be > 0"));
        }

        let m = &self.mapping;
        if !(m.speed_to_ms.is_finite() && m.speed_to_ms > 0.0) {
            errors.push(ConfigError::new("mapping.speed_to_ms", "must be > 0"));
        }
        if !(m.green_skew.is_finite() && m.green_skew > 0.0) {
            errors.push(ConfigError::new("mapping.green_skew", "must be > 0"));
        }

        if let Some(endpoint) = &self.telemetry.endpoint {
            if endpoint.trim().is_empty() {
                errors.push(ConfigError::new(
                    "telemetry.endpoint",
                    "must not be blank; omit it to disable telemetry",
                ));
            }
        }

        if self.server.port == 0 {
            errors.push(ConfigError::new("server.port", "must be != 0"));
        }

        errors
    }

    /// Checks the fields the DataPoint provider needs.
    pub fn validate_datapoint(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let p = &self.provider;
        if p.location_id.trim().is_empty() {
            errors.push(ConfigError::new("provider.location_id", "must be set"));
        }
        if p.api_key.trim().is_empty() {
            errors.push(ConfigError::new(
                "provider.api_key",
                "must be set (or pass DATAPOINT_API_KEY)",
            ));
        }
        if p.base_url.trim().is_empty() {
            errors.push(ConfigError::new("provider.base_url", "must be set"));
        }
        errors
    }

    /// Builds the output mapper described by the turbine and mapping sections.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the curve or rating is invalid.
    pub fn output_mapper(&self) -> Result<OutputMapper, ConfigError> {
        let curve = PowerCurve::new(self.turbine.curve.clone()).ok_or_else(|| {
            ConfigError::new(
                "turbine.curve",
                "must be non-empty with finite entries >= 0",
            )
        })?;
        if !(self.turbine.max_output_kw.is_finite() && self.turbine.max_output_kw > 0.0) {
            return Err(ConfigError::new("turbine.max_output_kw", "must be > 0"));
        }
        Ok(OutputMapper::new(
            curve,
            self.turbine.max_output_kw,
            self.mapping.speed_to_ms,
            self.mapping.green_skew,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = ServiceConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn default_needs_datapoint_credentials() {
        let errors = ServiceConfig::default().validate_datapoint();
        assert!(errors.iter().any(|e| e.field == "provider.location_id"));
        assert!(errors.iter().any(|e| e.field == "provider.api_key"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[provider]
location_id = "352409"
api_key = "abc"
timeout_secs = 5

[turbine]
curve = [0.0, 10.0, 40.0, 90.0]
max_output_kw = 100.0

[mapping]
green_skew = 1.5

[telemetry]
endpoint = "http://example.invalid/log"

[server]
port = 8080
"#;
        let cfg = ServiceConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.provider.location_id.as_str()),
            Some("352409")
        );
        assert_eq!(cfg.as_ref().map(|c| c.turbine.curve.len()), Some(4));
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(8080));
        assert!(cfg.map(|c| c.validate_datapoint().is_empty()).unwrap_or(false));
    }

    #[test]
    fn turbine_curve_key_is_curve() {
        let cfg = ServiceConfig::from_toml_str("[turbine]\ncurve = [0.0, 5.0]\n");
        assert_eq!(cfg.ok().map(|c| c.turbine.curve), Some(vec![0.0, 5.0]));

        let old = ServiceConfig::from_toml_str("[turbine]\ncurve_kw = [0.0, 5.0]\n");
        assert!(old.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[mapping]
green_skew = 2.0
"#;
        let cfg = ServiceConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.mapping.green_skew), Some(2.0));
        assert_eq!(cfg.as_ref().map(|c| c.mapping.speed_to_ms), Some(MPH_TO_MS));
        assert_eq!(cfg.as_ref().map(|c| c.turbine.max_output_kw), Some(910.0));
        assert_eq!(
            cfg.as_ref().map(|c| c.provider.resolution.as_str()),
            Some("3hourly")
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[turbine]
max_output_kw = 910.0
rotor_diameter = 44
"#;
        assert!(ServiceConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_empty_curve() {
        let mut cfg = ServiceConfig::default();
        cfg.turbine.curve.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "turbine.curve"));
        assert!(cfg.output_mapper().is_err());
    }

    #[test]
    fn validation_catches_negative_power() {
        let mut cfg = ServiceConfig::default();
        cfg.turbine.curve[3] = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "turbine.curve"));
    }

    #[test]
    fn validation_catches_zero_max_output() {
        let mut cfg = ServiceConfig::default();
        cfg.turbine.max_output_kw = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "turbine.max_output_kw"));
        assert!(cfg.output_mapper().is_err());
    }

    #[test]
    fn validation_catches_bad_mapping_and_port() {
        let mut cfg = ServiceConfig::default();
        cfg.mapping.green_skew = 0.0;
        cfg.mapping.speed_to_ms = f64::NAN;
        cfg.server.port = 0;
        cfg.provider.timeout_secs = 0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"mapping.green_skew".to_string()));
        assert!(fields.contains(&"mapping.speed_to_ms".to_string()));
        assert!(fields.contains(&"server.port".to_string()));
        assert!(fields.contains(&"provider.timeout_secs".to_string()));
    }

    #[test]
    fn blank_telemetry_endpoint_rejected() {
        let mut cfg = ServiceConfig::default();
        cfg.telemetry.endpoint = Some("  ".to_string());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "telemetry.endpoint"));
    }

    #[test]
    fn default_mapper_reproduces_regression_case() {
        use crate::pipeline::types::ForecastSample;

        let mapper = ServiceConfig::default().output_mapper();
        assert!(mapper.is_ok());
        let d = mapper.map(|m| m.map(&ForecastSample::new(0, 10.0), 0)).ok();
        assert_eq!(d.map(|d| (d.red_intensity, d.green_intensity)), Some((84, 16)));
    }
}
