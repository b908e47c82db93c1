use crate::types::{CurrentResponse, DetailWeather, WeatherSummary};
use citywx_core::{HttpConfig, TemperatureUnit, WeatherConfig, WeatherError};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// OpenWeatherMap current-conditions client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoint: String,
    api_key: Option<String>,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: &WeatherConfig, http: &HttpConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: format!("{}/weather", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            unit: config.temperature_unit,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Current, high and low temperature for a table row.
    ///
    /// # Errors
    /// See [`WeatherProvider::fetch_detail`].
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_summary(&self, city: &str) -> Result<WeatherSummary, WeatherError> {
        Ok(self.current(city).await?.into_summary())
    }

    /// Full snapshot for the detail view.
    ///
    /// # Errors
    /// `CityNotFound` on 404, `InvalidApiKey` on 401, `ApiError` for other
    /// statuses, `Transport` for transport failures and `InvalidPayload` when
    /// the body lacks required fields.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_detail(&self, city: &str) -> Result<DetailWeather, WeatherError> {
        self.current(city).await?.into_detail(city, self.unit)
    }

    async fn current(&self, city: &str) -> Result<CurrentResponse, WeatherError> {
        let mut query = vec![("q", city), ("units", self.unit.api_units())];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("appid", key));
        }

        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| WeatherError::InvalidPayload(e.to_string()))
        } else if status == StatusCode::NOT_FOUND {
            Err(WeatherError::CityNotFound(city.to_string()))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(WeatherError::InvalidApiKey)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(WeatherError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, unit: TemperatureUnit) -> WeatherProvider {
        let config = WeatherConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            temperature_unit: unit,
            ..WeatherConfig::default()
        };
        WeatherProvider::new(&config, &HttpConfig::default()).unwrap()
    }

    fn body(temp: f64) -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"description": "overcast clouds", "icon": "04n"}],
            "main": {"temp": temp, "temp_min": temp - 1.0, "temp_max": temp + 1.0, "humidity": 90, "pressure": 1020},
            "visibility": 10000,
            "wind": {"speed": 3.6},
            "sys": {"sunrise": 1700000000, "sunset": 1700030000},
            "name": "London"
        })
    }

    #[tokio::test]
    async fn test_fetch_summary_sends_unit_and_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(8.5)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server, TemperatureUnit::Celsius);
        let summary = provider.fetch_summary("London").await.unwrap();

        assert_eq!(summary.temp, 8.5);
        assert_eq!(summary.temp_high, 9.5);
        assert_eq!(summary.temp_low, 7.5);
    }

    #[tokio::test]
    async fn test_detail_uses_same_unit_as_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(47.3)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server, TemperatureUnit::Fahrenheit);
        let detail = provider.fetch_detail("London").await.unwrap();

        assert_eq!(detail.rounded_temperature(), 47);
        assert_eq!(detail.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(detail.city, "London");
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404", "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server, TemperatureUnit::Celsius);
        let result = provider.fetch_detail("Atlantis").await;

        assert!(matches!(result, Err(WeatherError::CityNotFound(ref c)) if c == "Atlantis"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server, TemperatureUnit::Celsius);
        let result = provider.fetch_summary("London").await;

        assert!(matches!(result, Err(WeatherError::InvalidApiKey)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server, TemperatureUnit::Celsius);
        let result = provider.fetch_detail("London").await;

        assert!(matches!(
            result,
            Err(WeatherError::ApiError { status: 502, .. })
        ));
    }
}
