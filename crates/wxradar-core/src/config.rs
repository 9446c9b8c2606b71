use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Radar grid and animation settings
    #[serde(default)]
    pub radar: RadarConfig,

    /// Location shown when the process starts
    #[serde(default)]
    pub location: LocationConfig,

    /// Upstream weather and geocoding endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which symbol set the grid is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Squares,
    Circles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in rows
    pub height: usize,

    /// Rows carried by each display segment
    pub rows_per_segment: usize,

    /// Pause between animation cycles
    pub tick_interval_ms: u64,

    /// Phase advance per animation cycle
    pub phase_step: f64,

    /// How long an observation stays fresh
    pub observation_ttl_ms: i64,

    /// Pause between segment creations
    pub create_delay_ms: u64,

    /// Pause between segment deletions
    pub delete_delay_ms: u64,

    /// Pause between segment edits after a location change
    pub relocate_delay_ms: u64,

    pub palette: Palette,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            width: 22,
            height: 21,
            rows_per_segment: 7,
            tick_interval_ms: 300,
            phase_step: 0.1,
            observation_ttl_ms: 300_000,
            create_delay_ms: 350,
            delete_delay_ms: 100,
            relocate_delay_ms: 300,
            palette: Palette::Squares,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Katy, TX".to_string(),
            latitude: 29.785786,
            longitude: -95.824394,
        }
    }
}

/// Open-Meteo forecast endpoint used unless configured otherwise.
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
/// Open-Meteo geocoding endpoint used unless configured otherwise.
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Open-Meteo forecast endpoint
    pub weather_url: String,

    /// Open-Meteo geocoding endpoint
    pub geocoding_url: String,

    /// Upper bound on any single upstream request
    pub request_timeout_ms: u64,

    /// Retries for geocoding lookups
    pub retry_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            request_timeout_ms: 10_000,
            retry_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings; logging may not
    /// be up yet, so reporting them is left to the caller.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let radar = &self.radar;

        if radar.width == 0 {
            result.add_error("radar.width", "Grid width must be greater than 0");
        } else if radar.width > 200 {
            result.add_warning("radar.width", "Grid width is unusually large (>200)");
        }

        if radar.height == 0 {
            result.add_error("radar.height", "Grid height must be greater than 0");
        }

        if radar.rows_per_segment == 0 {
            result.add_error(
                "radar.rows_per_segment",
                "Rows per segment must be greater than 0",
            );
        } else if radar.rows_per_segment > radar.height && radar.height > 0 {
            result.add_warning(
                "radar.rows_per_segment",
                "Rows per segment exceeds grid height; the map will use one segment",
            );
        }

        if radar.tick_interval_ms == 0 {
            result.add_error(
                "radar.tick_interval_ms",
                "Animation interval must be greater than 0",
            );
        }

        if !radar.phase_step.is_finite() || radar.phase_step <= 0.0 {
            result.add_error("radar.phase_step", "Phase step must be a positive number");
        }

        if radar.observation_ttl_ms <= 0 {
            result.add_warning(
                "radar.observation_ttl_ms",
                "Observation cache disabled; every cycle will refetch",
            );
        }

        if !(-90.0..=90.0).contains(&self.location.latitude) {
            result.add_error("location.latitude", "Latitude must be within -90..=90");
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            result.add_error("location.longitude", "Longitude must be within -180..=180");
        }
        if self.location.name.trim().is_empty() {
            result.add_warning("location.name", "Default location has no name");
        }

        self.validate_url(&self.api.weather_url, "api.weather_url", &mut result);
        self.validate_url(&self.api.geocoding_url, "api.geocoding_url", &mut result);

        if self.api.request_timeout_ms == 0 {
            result.add_error(
                "api.request_timeout_ms",
                "Request timeout must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("wxradar");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.api.weather_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "api.weather_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.api.geocoding_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_grid_dimensions() {
        let mut config = Config::default();
        config.radar.width = 0;
        config.radar.rows_per_segment = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "radar.width"));
        assert!(result.errors.iter().any(|e| e.field == "radar.rows_per_segment"));
    }

    #[test]
    fn test_oversized_segment_is_warning() {
        let mut config = Config::default();
        config.radar.rows_per_segment = 50;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "radar.rows_per_segment"));
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut config = Config::default();
        config.location.latitude = 91.0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "location.latitude"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.radar.width, 22);
        assert_eq!(config.location.name, "Katy, TX");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[radar]\nheight = 30\npalette = \"circles\"\n\n[location]\nname = \"Oslo\"\nlatitude = 59.91\nlongitude = 10.75\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.radar.height, 30);
        assert_eq!(config.radar.width, 22);
        assert_eq!(config.radar.palette, Palette::Circles);
        assert_eq!(config.location.name, "Oslo");
        assert_eq!(config.api.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[radar\nwidth = ").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_validated_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[radar]\nwidth = 0\n").unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("radar.width"));
        assert!(matches!(
            crate::AppError::from_startup(err),
            crate::AppError::Config(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_file_reports_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[radar\nwidth = ").unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        assert!(matches!(
            crate::AppError::from_startup(err),
            crate::AppError::Config(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_default_endpoints() {
        let api = ApiConfig::default();
        assert_eq!(api.weather_url, DEFAULT_WEATHER_URL);
        assert_eq!(api.geocoding_url, DEFAULT_GEOCODING_URL);
    }
}
