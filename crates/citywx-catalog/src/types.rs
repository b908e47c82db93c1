use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One page of the `records` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<RawCity>,
}

/// City record as returned by the catalog API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cou_name_en: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_population")]
    pub population: Option<u64>,
}

/// A city row. Weather lookups key on `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub country: String,
    pub time_zone: String,
    pub country_code: String,
    pub population: Option<u64>,
}

impl CityRecord {
    /// Population as displayed in the table; empty when unknown.
    pub fn population_label(&self) -> String {
        self.population.map(|p| p.to_string()).unwrap_or_default()
    }
}

impl From<RawCity> for CityRecord {
    fn from(raw: RawCity) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            country: raw.cou_name_en.unwrap_or_default(),
            time_zone: raw.timezone.unwrap_or_default(),
            country_code: raw.country_code.unwrap_or_default(),
            population: raw.population,
        }
    }
}

/// Accepts `12345`, `12345.0` or `"12345"`; anything else becomes `None`.
fn deserialize_population<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
