use chrono::{DateTime, Local, TimeZone, Utc};
use citywx_core::{TemperatureUnit, WeatherError};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

/// Weather condition categories mapped from OpenWeatherMap icon codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert an icon code such as `"10d"` to a condition.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_icon_code(icon: &str) -> Self {
        match icon.get(..2).unwrap_or_default() {
            "01" => Self::Clear,
            "02" => Self::PartlyCloudy,
            "03" | "04" => Self::Cloudy,
            "09" => Self::Drizzle,
            "10" => Self::Rain,
            "11" => Self::Thunderstorm,
            "13" => Self::Snow,
            "50" => Self::Fog,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Temperatures shown in a table row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub temp: f64,
    pub temp_high: f64,
    pub temp_low: f64,
}

/// Current weather for a single city, as shown on its detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailWeather {
    pub city: String,
    pub condition: WeatherCondition,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    /// Metres; the service omits it for some stations
    pub visibility: Option<u32>,
    pub longitude: f64,
    pub latitude: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub unit: TemperatureUnit,
}

impl DetailWeather {
    pub fn rounded_temperature(&self) -> i64 {
        round_temp(self.temperature)
    }

    pub fn rounded_min(&self) -> i64 {
        round_temp(self.temp_min)
    }

    pub fn rounded_max(&self) -> i64 {
        round_temp(self.temp_max)
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility.map(|m| f64::from(m) / 1000.0)
    }

    pub fn icon_url(&self) -> String {
        format!("{}/{}.png", ICON_BASE_URL, self.icon)
    }

    pub fn sunrise_local(&self) -> String {
        self.sunrise.with_timezone(&Local).format("%H:%M:%S").to_string()
    }

    pub fn sunset_local(&self) -> String {
        self.sunset.with_timezone(&Local).format("%H:%M:%S").to_string()
    }
}

/// Nearest integer, halves go up: `-2.5` shows as `-2`, `2.5` as `3`.
fn round_temp(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

// ---- wire format ----

#[derive(Debug, Deserialize)]
pub(crate) struct MainBlock {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionBlock {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindBlock {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoordBlock {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SysBlock {
    pub sunrise: i64,
    pub sunset: i64,
}

/// Body of `GET /weather`.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
    #[serde(default)]
    pub wind: Option<WindBlock>,
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub coord: Option<CoordBlock>,
    #[serde(default)]
    pub sys: Option<SysBlock>,
}

impl CurrentResponse {
    pub(crate) fn into_summary(self) -> WeatherSummary {
        WeatherSummary {
            temp: self.main.temp,
            temp_high: self.main.temp_max,
            temp_low: self.main.temp_min,
        }
    }

    pub(crate) fn into_detail(
        self,
        requested_city: &str,
        unit: TemperatureUnit,
    ) -> Result<DetailWeather, WeatherError> {
        let coord = self
            .coord
            .ok_or_else(|| WeatherError::InvalidPayload("missing coord".into()))?;
        let sys = self
            .sys
            .ok_or_else(|| WeatherError::InvalidPayload("missing sys".into()))?;
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::InvalidPayload("missing weather[0]".into()))?;

        Ok(DetailWeather {
            city: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| requested_city.to_string()),
            condition: WeatherCondition::from_icon_code(&condition.icon),
            description: condition.description,
            icon: condition.icon,
            temperature: self.main.temp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity: self.main.humidity.unwrap_or_default(),
            pressure: self.main.pressure.unwrap_or_default(),
            wind_speed: self.wind.map(|w| w.speed).unwrap_or_default(),
            visibility: self.visibility,
            longitude: coord.lon,
            latitude: coord.lat,
            sunrise: unix_time(sys.sunrise)?,
            sunset: unix_time(sys.sunset)?,
            unit,
        })
    }
}

fn unix_time(secs: i64) -> Result<DateTime<Utc>, WeatherError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| WeatherError::InvalidPayload(format!("invalid timestamp {}", secs)))
}
