//! Weather service for citywx
//!
//! Current conditions from the OpenWeatherMap `weather` endpoint, in two
//! shapes: a compact [`WeatherSummary`] for table rows and a full
//! [`DetailWeather`] snapshot for the per-city view.

pub mod provider;
pub mod types;

pub use citywx_core::{TemperatureUnit, WeatherError};
pub use provider::WeatherProvider;
pub use types::*;
