//! Weather enrichment for freshly loaded table rows.
//!
//! One lookup per row, keyed by city name. Each lookup stands alone: a
//! failure only leaves that row without weather. Both scheduling policies
//! merge results in row order, so a duplicated name always ends up with the
//! weather of its last row.

use std::collections::HashMap;

use citywx_catalog::CityRecord;
use citywx_core::EnrichmentPolicy;
use citywx_weather::{WeatherError, WeatherProvider, WeatherSummary};
use tokio::task::JoinSet;

/// Joined result of one enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    pub summaries: HashMap<String, WeatherSummary>,
    /// Names whose lookup failed, in row order
    pub failed: Vec<String>,
}

impl EnrichmentOutcome {
    fn record(&mut self, name: &str, result: Result<WeatherSummary, WeatherError>) {
        match result {
            Ok(summary) => {
                self.summaries.insert(name.to_string(), summary);
            }
            Err(e) => {
                tracing::debug!("Weather lookup for {} failed: {}", name, e);
                self.failed.push(name.to_string());
            }
        }
    }
}

/// Look up weather for every city in `cities`.
pub async fn enrich_with_weather(
    provider: &WeatherProvider,
    cities: &[CityRecord],
    policy: EnrichmentPolicy,
) -> EnrichmentOutcome {
    let outcome = match policy {
        EnrichmentPolicy::Sequential => enrich_sequential(provider, cities).await,
        EnrichmentPolicy::Parallel => enrich_parallel(provider, cities).await,
    };

    tracing::info!(
        "Enriched {} cities ({} lookups failed)",
        cities.len(),
        outcome.failed.len()
    );
    outcome
}

async fn enrich_sequential(provider: &WeatherProvider, cities: &[CityRecord]) -> EnrichmentOutcome {
    let mut outcome = EnrichmentOutcome::default();
    for city in cities {
        let result = provider.fetch_summary(&city.name).await;
        outcome.record(&city.name, result);
    }
    outcome
}

async fn enrich_parallel(provider: &WeatherProvider, cities: &[CityRecord]) -> EnrichmentOutcome {
    let mut tasks = JoinSet::new();
    for (index, city) in cities.iter().enumerate() {
        let provider = provider.clone();
        let name = city.name.clone();
        tasks.spawn(async move {
            let result = provider.fetch_summary(&name).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<WeatherSummary, WeatherError>>> =
        std::iter::repeat_with(|| None).take(cities.len()).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::warn!("Weather lookup task failed: {}", e),
        }
    }

    let mut outcome = EnrichmentOutcome::default();
    for (city, result) in cities.iter().zip(results) {
        match result {
            Some(result) => outcome.record(&city.name, result),
            None => outcome.failed.push(city.name.clone()),
        }
    }
    outcome
}
