pub mod cache;
pub mod extract;
pub mod fetch;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::AggregatorConfig;
use cache::QuoteCache;
use fetch::{HttpTransport, PriceTransport, QuoteFetcher};
use registry::{ProviderKeys, ProviderRegistry};
use types::{Asset, SortedPrices, SourcePrice};

pub struct PriceAggregator {
    registry: ProviderRegistry,
    fetcher: QuoteFetcher,
}

impl PriceAggregator {
    /// Standard roster over a real HTTP client, sized by `config`. Keys for
    /// the credential-gated providers come from the environment.
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let registry = ProviderRegistry::standard(&ProviderKeys::from_env())?;
        let transport = HttpTransport::new(Duration::from_millis(config.fetch_timeout_ms))?;
        Ok(Self::with_transport(
            registry,
            Arc::new(transport),
            Duration::from_secs(config.cache_ttl_secs),
        ))
    }

    pub fn with_transport(
        registry: ProviderRegistry,
        transport: Arc<dyn PriceTransport>,
        cache_ttl: Duration,
    ) -> Self {
        let fetcher = QuoteFetcher::new(transport, QuoteCache::new(cache_ttl));
        Self { registry, fetcher }
    }

    /// One concurrent round across the whole roster. Waits for every
    /// provider, drops the unavailable ones, sorts the rest cheapest first.
    /// A fully failed round yields an empty list, not an error.
    pub async fn aggregate(&self, asset: Asset) -> SortedPrices {
        let mut futures = Vec::new();
        for provider in self.registry.providers() {
            futures.push(self.fetcher.fetch(provider, asset));
        }

        let quotes = futures::future::join_all(futures).await;

        let mut available: Vec<(&str, f64)> = quotes
            .into_iter()
            .filter_map(|quote| quote.price.map(|price| (quote.provider, price)))
            .collect();

        // Stable sort keeps roster order for equal prices.
        available.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        SortedPrices {
            sorted_prices: available
                .into_iter()
                .map(|(source, price)| SourcePrice {
                    source: source.to_string(),
                    price: format!("{:.4}", price),
                })
                .collect(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn fetcher(&self) -> &QuoteFetcher {
        &self.fetcher
    }
}
