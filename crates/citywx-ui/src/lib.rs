//! View-model layer for citywx.
//!
//! `ListController` owns the paginated city table and its weather
//! annotations; `DetailFetcher` backs the per-city page. Filtering and
//! sorting live in [`projection`] as pure functions over city slices.

pub mod models;
pub mod projection;
pub mod routes;
pub mod services;

pub use models::detail_fetcher::{DetailFetcher, DetailState};
pub use models::list_controller::{CityRow, ListController, ListState, LoadOutcome, ScrollPosition};
pub use projection::{Column, FilterState, SortOrder, SortState, UnknownColumn};
pub use routes::Route;
pub use services::enrichment::{enrich_with_weather, EnrichmentOutcome};
