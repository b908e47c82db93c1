//! Per-city weather page model.

use citywx_core::{AppError, Config};
use citywx_weather::{DetailWeather, WeatherProvider};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading { city: String },
    Loaded(DetailWeather),
    NotFound { city: String },
    Failed { city: String, message: String },
}

impl DetailState {
    /// Message shown in place of the weather panel, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            DetailState::NotFound { .. } => Some("City not found"),
            DetailState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&DetailWeather> {
        match self {
            DetailState::Loaded(weather) => Some(weather),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    state: DetailState,
}

/// Fetches one weather snapshot per `open`. Nothing is cached; the most
/// recently opened city always owns the state.
pub struct DetailFetcher {
    weather: WeatherProvider,
    inner: Mutex<Inner>,
}

impl DetailFetcher {
    pub fn new(weather: WeatherProvider) -> Self {
        Self {
            weather,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(WeatherProvider::new(&config.weather, &config.http)?))
    }

    /// Navigate to `city` and fetch its weather.
    ///
    /// Returns the state after this fetch; if another `open` started in the
    /// meantime, its state is returned unchanged.
    pub async fn open(&self, city: &str) -> DetailState {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.state = DetailState::Loading {
                city: city.to_string(),
            };
            inner.generation
        };

        let result = self.weather.fetch_detail(city).await;

        let next = match result {
            Ok(weather) => DetailState::Loaded(weather),
            Err(e) if e.is_not_found() => {
                tracing::info!("No weather for {}", city);
                DetailState::NotFound {
                    city: city.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Weather detail for {} failed: {}", city, e);
                DetailState::Failed {
                    city: city.to_string(),
                    message: e.user_message().to_string(),
                }
            }
        };

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.state = next;
        } else {
            tracing::debug!("Dropping stale weather detail for {}", city);
        }
        inner.state.clone()
    }

    pub fn state(&self) -> DetailState {
        self.inner.lock().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_messages() {
        assert_eq!(DetailState::Idle.error_message(), None);
        assert_eq!(
            DetailState::NotFound {
                city: "Atlantis".into()
            }
            .error_message(),
            Some("City not found")
        );
        let failed = DetailState::Failed {
            city: "Oslo".into(),
            message: "Error fetching weather data".into(),
        };
        assert_eq!(failed.error_message(), Some("Error fetching weather data"));
        assert!(failed.weather().is_none());
    }
}
