//! opendatasoft catalog client.

use std::sync::Arc;
use std::time::Duration;

use citywx_core::{CatalogConfig, CatalogError, HttpConfig};
use reqwest::Client;
use tracing::instrument;

use crate::types::{CatalogPage, CityRecord};

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Arc<Client>,
    records_url: String,
    page_size: u32,
}

impl CatalogClient {
    /// Build a client for the dataset named in `config`.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig, http: &HttpConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        let records_url = format!(
            "{}/catalog/datasets/{}/records",
            config.base_url.trim_end_matches('/'),
            config.dataset
        );

        Ok(Self {
            client: Arc::new(client),
            records_url,
            page_size: config.page_size,
        })
    }

    /// Fetch one page of cities. `page` is 1-indexed.
    ///
    /// # Errors
    /// Returns `CatalogError` on transport failures, non-success statuses
    /// and malformed bodies.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<CityRecord>, CatalogError> {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(self.page_size);

        let response = self
            .client
            .get(&self.records_url)
            .query(&[
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let body: CatalogPage = self.handle_response(response).await?;
        let cities: Vec<CityRecord> = body.results.into_iter().map(CityRecord::from).collect();

        tracing::debug!("Catalog page {} returned {} cities", page, cities.len());
        Ok(cities)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| CatalogError::InvalidPayload(e.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CatalogError::Status {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}
