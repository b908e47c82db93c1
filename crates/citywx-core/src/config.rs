use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

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

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

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
    /// City catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Weather service settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// List view behavior
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root of the opendatasoft explore API
    pub base_url: String,

    /// Dataset identifier queried for city records
    pub dataset: String,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://public.opendatasoft.com/api/explore/v2.1".to_string(),
            dataset: "geonames-all-cities-with-a-population-1000".to_string(),
            page_size: default_page_size(),
        }
    }
}

/// Temperature unit requested from the weather service.
///
/// The same unit is used for list rows and the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Value of the `units` query parameter.
    pub fn api_units(&self) -> &'static str {
        match self {
            Self::Celsius => "metric",
            Self::Fahrenheit => "imperial",
            Self::Kelvin => "standard",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }

    /// Wind speed unit reported for this unit system.
    pub fn speed_unit(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "mph",
            Self::Celsius | Self::Kelvin => "m/s",
        }
    }
}

/// How per-row weather lookups are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentPolicy {
    /// One lookup at a time, in row order
    Sequential,
    /// All lookups for a page in flight together
    #[default]
    Parallel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Root of the OpenWeatherMap data API
    pub base_url: String,

    /// API key (`OPENWEATHER_API_KEY` takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature unit preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// Scheduling of row enrichment lookups
    #[serde(default)]
    pub enrichment: EnrichmentPolicy,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
            temperature_unit: TemperatureUnit::default(),
            enrichment: EnrichmentPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Distance from the bottom (in pixels) that triggers the next page
    pub scroll_threshold_px: u32,

    /// Entries offered by the search box
    pub suggestion_limit: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 5,
            suggestion_limit: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    ///
    /// # Errors
    /// Fails when the config directory is unknown or the file cannot be read,
    /// parsed or written.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.weather.api_key =
            resolve_api_key(config.weather.api_key.take(), std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist.
    ///
    /// # Errors
    /// Fails when the file cannot be read, parsed or created.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    ///
    /// # Errors
    /// Fails on load errors or when validation reports errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.catalog.base_url, "catalog.base_url", &mut result);
        validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.catalog.dataset.trim().is_empty() {
            result.add_error("catalog.dataset", "Dataset name must not be empty");
        }

        if self.catalog.page_size == 0 {
            result.add_error("catalog.page_size", "Page size must be greater than 0");
        } else if self.catalog.page_size > 100 {
            // opendatasoft rejects limit > 100
            result.add_error("catalog.page_size", "Page size cannot exceed 100");
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        } else if self.http.timeout_secs > 300 {
            result.add_warning("http.timeout_secs", "Timeout is more than 5 minutes");
        }

        match self.weather.api_key.as_deref() {
            None => result.add_warning(
                "weather.api_key",
                format!(
                    "No weather API key configured (set {}); temperatures will be unavailable",
                    API_KEY_ENV
                ),
            ),
            Some(key) if key.trim().is_empty() => {
                result.add_error("weather.api_key", "API key must not be blank")
            }
            Some(_) => {}
        }

        result
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// Fails when the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    ///
    /// # Errors
    /// Fails when the platform has no config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("citywx");

        Ok(config_dir.join("config.toml"))
    }
}

/// Environment value wins over the file; blank environment values are ignored.
fn resolve_api_key(from_file: Option<String>, from_env: Option<String>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or(from_file)
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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
    fn test_missing_api_key_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.api_key"));
    }

    #[test]
    fn test_blank_api_key_is_error() {
        let mut config = Config::default();
        config.weather.api_key = Some("  ".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "weather.base_url"));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = Config::default();
        config.catalog.page_size = 0;
        assert!(!config.validate().is_valid());
        config.catalog.page_size = 101;
        assert!(!config.validate().is_valid());
        config.catalog.page_size = 20;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "http.timeout_secs"));
    }

    #[test]
    fn test_env_api_key_wins() {
        assert_eq!(
            resolve_api_key(Some("file".into()), Some("env".into())).as_deref(),
            Some("env")
        );
        assert_eq!(
            resolve_api_key(Some("file".into()), Some(" ".into())).as_deref(),
            Some("file")
        );
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.catalog.page_size, 20);
        assert_eq!(config.ui.scroll_threshold_px, 5);
    }

    #[test]
    fn test_load_from_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[weather]
base_url = "http://localhost:9000"
temperature_unit = "fahrenheit"
enrichment = "sequential"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.weather.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.weather.enrichment, EnrichmentPolicy::Sequential);
        assert_eq!(config.catalog.page_size, 20);
    }

    #[test]
    fn test_temperature_unit_query_values() {
        assert_eq!(TemperatureUnit::Celsius.api_units(), "metric");
        assert_eq!(TemperatureUnit::Fahrenheit.api_units(), "imperial");
        assert_eq!(TemperatureUnit::Kelvin.api_units(), "standard");
        assert_eq!(TemperatureUnit::Fahrenheit.speed_unit(), "mph");
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
}
