pub mod detail_fetcher;
pub mod list_controller;
