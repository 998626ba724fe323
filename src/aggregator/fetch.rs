use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::cache::QuoteCache;
use super::registry::Provider;
use super::types::{Asset, Quote};

/// Transport used to reach providers. Implementations fetch and decode one
/// body; interpreting it stays with the caller.
#[async_trait]
pub trait PriceTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Shared reqwest client. The connection pool keeps provider connections
/// alive across rounds; every request carries the configured timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PriceTransport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Resolves one (provider, asset) pair to a quote: cache first, then a
/// single GET. Every failure mode collapses into an unavailable quote;
/// no error value ever leaves `fetch`.
pub struct QuoteFetcher {
    transport: Arc<dyn PriceTransport>,
    cache: QuoteCache,
}

impl QuoteFetcher {
    pub fn new(transport: Arc<dyn PriceTransport>, cache: QuoteCache) -> Self {
        Self { transport, cache }
    }

    pub async fn fetch(&self, provider: &Provider, asset: Asset) -> Quote {
        if let Some(price) = self.cache.get(provider.name, asset) {
            return Quote::available(provider.name, price);
        }

        let url = provider.url(asset);
        let body = match self.transport.get_json(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("{} request failed for {}: {:#}", provider.name, asset, e);
                return Quote::unavailable(provider.name);
            }
        };

        match (provider.extract)(&body, provider.symbol(asset)) {
            Some(price) => {
                self.cache.insert(provider.name, asset, price);
                Quote::available(provider.name, price)
            }
            None => {
                tracing::warn!("{} returned no usable {} price", provider.name, asset);
                Quote::unavailable(provider.name)
            }
        }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }
}
