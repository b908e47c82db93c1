//! Navigation targets: `/` for the table, `/weather/:city` for a city page.

use std::fmt;

const WEATHER_PREFIX: &str = "/weather/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Weather(String),
}

impl Route {
    /// Parse a path. Query strings and fragments are ignored; the city
    /// segment is percent-decoded.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if path == "/" || path.is_empty() {
            return Some(Route::List);
        }

        let segment = path.strip_prefix(WEATHER_PREFIX)?;
        let segment = segment.strip_suffix('/').unwrap_or(segment);
        if segment.is_empty() || segment.contains('/') {
            return None;
        }

        let city = urlencoding::decode(segment).ok()?;
        Some(Route::Weather(city.into_owned()))
    }

    /// Link to the detail page of `city`.
    pub fn weather(city: &str) -> Route {
        Route::Weather(city.to_string())
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Weather(city) => format!("{}{}", WEATHER_PREFIX, urlencoding::encode(city)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
