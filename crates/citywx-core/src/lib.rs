//! Shared configuration, error types and logging setup for citywx.

pub mod config;
pub mod error;

pub use config::{
    CatalogConfig, Config, EnrichmentPolicy, HttpConfig, TemperatureUnit, UiConfig,
    ValidationResult, WeatherConfig,
};
pub use error::{AppError, CatalogError, TransportError, WeatherError};

use anyhow::Result;

/// Initialize logging for the citywx binaries
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("citywx core initialized");
    Ok(())
}
