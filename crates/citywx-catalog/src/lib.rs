//! City catalog access for citywx.
//!
//! Pages through the opendatasoft geonames dataset and maps raw records
//! into immutable [`CityRecord`] rows.

pub mod client;
pub mod types;

pub use citywx_core::CatalogError;
pub use client::CatalogClient;
pub use types::{CatalogPage, CityRecord, RawCity};
