//! Error types shared by the citywx crates.
//!
//! `Display` carries the detail for logs. `user_message()` is the fixed text
//! the table or detail view shows instead.

use thiserror::Error;

/// Failure while wiring up the list or detail view from a [`crate::Config`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Catalog(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// A request that never produced an HTTP status.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    TimedOut,

    #[error("could not reach {0}")]
    Unreachable(String),

    #[error("transport failure: {0}")]
    Failed(String),
}

impl TransportError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TransportError::TimedOut => "The request timed out. Please try again.",
            TransportError::Unreachable(_) => "Unable to connect. Check your internet connection.",
            TransportError::Failed(_) => "The connection was interrupted. Please try again.",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::TimedOut
        } else if e.is_connect() {
            TransportError::Unreachable(
                e.url().map(|u| u.as_str().to_string()).unwrap_or_else(|| e.to_string()),
            )
        } else {
            TransportError::Failed(e.to_string())
        }
    }
}

/// City catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Catalog returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid catalog payload: {0}")]
    InvalidPayload(String),
}

impl CatalogError {
    /// Static message shown under the city table when a page fails to load.
    pub fn user_message(&self) -> &'static str {
        match self {
            CatalogError::Transport(e) => e.user_message(),
            CatalogError::Status { status: 404, .. } => {
                "City catalog not found. Check the catalog URL and try again."
            }
            CatalogError::Status { .. } => "Could not load cities. Scroll down to try again.",
            CatalogError::InvalidPayload(_) => {
                "The city catalog sent an unexpected response. Try again later."
            }
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Transport(e.into())
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Weather API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Weather request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid weather payload: {0}")]
    InvalidPayload(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::ApiError { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later."
            }
            WeatherError::ApiError { .. } | WeatherError::InvalidPayload(_) => {
                "Error fetching weather data"
            }
            WeatherError::Transport(e) => e.user_message(),
        }
    }

    /// Whether the service answered that it does not know the city.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::CityNotFound(_))
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Transport(e.into())
    }
}
