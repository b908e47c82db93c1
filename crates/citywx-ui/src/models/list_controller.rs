//! City table model: pagination, weather annotations, filters and sort.
//!
//! All session state sits in one `ListState` behind a mutex that is never
//! held across an await. Page loads are serialized by the `loading` flag,
//! and every load remembers the generation it started in; `reset()` bumps
//! the generation so results of loads started earlier are dropped.

use std::collections::HashMap;

use citywx_catalog::{CatalogClient, CityRecord};
use citywx_core::{AppError, CatalogError, Config, EnrichmentPolicy, TemperatureUnit};
use citywx_weather::{WeatherProvider, WeatherSummary};
use parking_lot::Mutex;

use crate::projection::{self, Column, FilterState, SortState};
use crate::services::enrichment::{self, EnrichmentOutcome};

/// Shown in the temperature cell until a lookup succeeds.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Snapshot of the table session.
#[derive(Debug, Clone)]
pub struct ListState {
    /// Every row loaded so far, in load order
    pub cities: Vec<CityRecord>,
    /// Filtered and sorted projection of `cities`
    pub visible: Vec<CityRecord>,
    pub weather: HashMap<String, WeatherSummary>,
    pub filters: FilterState,
    pub sort: SortState,
    /// Next page to request (1-indexed)
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error_message: Option<String>,
    generation: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            visible: Vec::new(),
            weather: HashMap::new(),
            filters: FilterState::default(),
            sort: SortState::default(),
            page: 1,
            has_more: true,
            loading: false,
            error_message: None,
            generation: 0,
        }
    }
}

impl ListState {
    fn reproject(&mut self) {
        self.visible = projection::project(&self.cities, &self.filters, self.sort);
    }
}

/// What a call to `load_next_page` did.
#[derive(Debug)]
pub enum LoadOutcome {
    /// A load was already running or the catalog is exhausted
    Skipped,
    Loaded { fetched: usize, failed_lookups: usize },
    Failed(CatalogError),
    /// The list was reset while this load was in flight
    Discarded,
}

/// Scroll metrics of the table viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub scroll_height: f64,
}

impl ScrollPosition {
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.scroll_height - threshold
    }
}

/// A visible row joined with its weather annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRow {
    pub city: CityRecord,
    pub weather: Option<WeatherSummary>,
}

impl CityRow {
    /// Temperature cell lines, or the loading placeholder.
    pub fn weather_lines(&self, unit: TemperatureUnit) -> Vec<String> {
        match &self.weather {
            Some(w) => vec![
                format!("Temp: {}{}", w.temp, unit.symbol()),
                format!("High: {}{}", w.temp_high, unit.symbol()),
                format!("Low: {}{}", w.temp_low, unit.symbol()),
            ],
            None => vec![LOADING_PLACEHOLDER.to_string()],
        }
    }
}

pub struct ListController {
    catalog: CatalogClient,
    weather: WeatherProvider,
    policy: EnrichmentPolicy,
    scroll_threshold_px: f64,
    state: Mutex<ListState>,
}

impl ListController {
    pub fn new(catalog: CatalogClient, weather: WeatherProvider, policy: EnrichmentPolicy) -> Self {
        Self {
            catalog,
            weather,
            policy,
            scroll_threshold_px: 5.0,
            state: Mutex::new(ListState::default()),
        }
    }

    /// # Errors
    /// Fails when either HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let catalog = CatalogClient::new(&config.catalog, &config.http)?;
        let weather = WeatherProvider::new(&config.weather, &config.http)?;
        Ok(Self::new(catalog, weather, config.weather.enrichment)
            .with_scroll_threshold(config.ui.scroll_threshold_px))
    }

    pub fn with_scroll_threshold(mut self, px: u32) -> Self {
        self.scroll_threshold_px = f64::from(px);
        self
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.weather.unit()
    }

    /// Fetch, enrich and append the next catalog page.
    pub async fn load_next_page(&self) -> LoadOutcome {
        let (page, generation) = {
            let mut state = self.state.lock();
            if state.loading || !state.has_more {
                tracing::debug!(
                    "Skipping page load (loading={}, has_more={})",
                    state.loading,
                    state.has_more
                );
                return LoadOutcome::Skipped;
            }
            state.loading = true;
            (state.page, state.generation)
        };

        tracing::info!("Loading catalog page {}", page);

        let cities = match self.catalog.fetch_page(page).await {
            Ok(cities) => cities,
            Err(e) => {
                let mut state = self.state.lock();
                if state.generation != generation {
                    return LoadOutcome::Discarded;
                }
                tracing::warn!("Failed to load catalog page {}: {}", page, e);
                state.loading = false;
                state.error_message = Some(e.user_message().to_string());
                return LoadOutcome::Failed(e);
            }
        };

        let outcome = self.enrich_with_weather(&cities).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!("Dropping stale page {} after reset", page);
            return LoadOutcome::Discarded;
        }

        let fetched = cities.len();
        state.weather.extend(outcome.summaries);
        state.cities.extend(cities);
        state.page += 1;
        state.has_more = fetched > 0;
        state.loading = false;
        state.error_message = None;
        state.reproject();

        LoadOutcome::Loaded {
            fetched,
            failed_lookups: outcome.failed.len(),
        }
    }

    /// Look up weather for `records` with the configured policy.
    pub async fn enrich_with_weather(&self, records: &[CityRecord]) -> EnrichmentOutcome {
        enrichment::enrich_with_weather(&self.weather, records, self.policy).await
    }

    /// Filter `list` with the current filters.
    pub fn apply_filters(&self, list: &[CityRecord]) -> Vec<CityRecord> {
        projection::apply_filters(list, &self.state.lock().filters)
    }

    /// Sort `list` in place with the current sort.
    pub fn sort_cities(&self, list: &mut [CityRecord]) {
        let sort = self.state.lock().sort;
        projection::sort_cities(list, sort);
    }

    pub fn set_filter(&self, column: Column, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.filters.set(column, value);
        state.reproject();
    }

    pub fn set_search(&self, term: impl Into<String>) {
        let mut state = self.state.lock();
        state.filters.search = term.into();
        state.reproject();
    }

    pub fn set_sort(&self, column: Column) {
        let mut state = self.state.lock();
        state.sort.toggle(column);
        state.reproject();
    }

    /// Load the next page when the viewport is near the bottom.
    pub async fn on_scroll(&self, position: ScrollPosition) -> LoadOutcome {
        if !position.is_near_bottom(self.scroll_threshold_px) || self.state.lock().loading {
            return LoadOutcome::Skipped;
        }
        self.load_next_page().await
    }

    /// Drop all rows and start again from page 1. Filters and sort are kept.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let generation = state.generation + 1;
        *state = ListState {
            filters: std::mem::take(&mut state.filters),
            sort: state.sort,
            generation,
            ..ListState::default()
        };
        tracing::info!("City list reset");
    }

    pub fn state(&self) -> ListState {
        self.state.lock().clone()
    }

    pub fn visible_rows(&self) -> Vec<CityRow> {
        let state = self.state.lock();
        state
            .visible
            .iter()
            .map(|city| CityRow {
                weather: state.weather.get(&city.name).copied(),
                city: city.clone(),
            })
            .collect()
    }

    /// Search box entries: the first `limit` visible rows as `Name (Country)`.
    pub fn suggestions(&self, limit: usize) -> Vec<String> {
        self.state
            .lock()
            .visible
            .iter()
            .take(limit)
            .map(|c| format!("{} ({})", c.name, c.country))
            .collect()
    }
}
