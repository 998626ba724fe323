use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::cache::QuoteCache;
use super::extract;
use super::fetch::{PriceTransport, QuoteFetcher};
use super::registry::{AssetSymbols, Provider, ProviderKeys, ProviderRegistry};
use super::types::{Asset, Quote, SourcePrice};
use super::PriceAggregator;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct FakeTransport {
    responses: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl FakeTransport {
    fn new(responses: Vec<(&str, Value)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceTransport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no response configured for {}", url))
    }
}

fn provider(name: &'static str, host: &str) -> Provider {
    Provider::new(
        name,
        format!("https://{}/ticker?symbol={{symbol}}", host),
        AssetSymbols { btc: "BTC", eth: "ETH" },
        extract::binance,
    )
}

#[tokio::test]
async fn test_aggregate_sorts_available_quotes_ascending() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![
        provider("Alpha", "alpha.test"),
        provider("Beta", "beta.test"),
        provider("Gamma", "gamma.test"),
    ])?;
    // Gamma has no canned response and fails at the transport level.
    let transport = Arc::new(FakeTransport::new(vec![
        ("https://alpha.test/ticker?symbol=BTC", json!({"price": 9.1})),
        ("https://beta.test/ticker?symbol=BTC", json!({"price": 8.7})),
    ]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport, Duration::from_secs(600));

    let result = aggregator.aggregate(Asset::Bitcoin).await;

    assert_eq!(
        result.sorted_prices,
        vec![
            SourcePrice { source: "Beta".to_string(), price: "8.7000".to_string() },
            SourcePrice { source: "Alpha".to_string(), price: "9.1000".to_string() },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_all_providers_failing_yields_empty_result() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![
        provider("Alpha", "alpha.test"),
        provider("Beta", "beta.test"),
    ])?;
    let transport = Arc::new(FakeTransport::new(vec![]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport, Duration::from_secs(600));

    let result = aggregator.aggregate(Asset::Bitcoin).await;

    assert!(result.is_empty());
    assert!(result.cheapest().is_none());
    Ok(())
}

#[tokio::test]
async fn test_equal_prices_keep_roster_order() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![
        provider("Alpha", "alpha.test"),
        provider("Beta", "beta.test"),
        provider("Gamma", "gamma.test"),
    ])?;
    let transport = Arc::new(FakeTransport::new(vec![
        ("https://alpha.test/ticker?symbol=BTC", json!({"price": 100.0})),
        ("https://beta.test/ticker?symbol=BTC", json!({"price": 100.0})),
        ("https://gamma.test/ticker?symbol=BTC", json!({"price": 99.5})),
    ]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport, Duration::from_secs(600));

    let result = aggregator.aggregate(Asset::Bitcoin).await;

    let sources: Vec<&str> = result.sorted_prices.iter().map(|p| p.source.as_str()).collect();
    assert_eq!(sources, vec!["Gamma", "Alpha", "Beta"]);
    assert_eq!(result.sorted_prices[1].price, "100.0000");
    assert_eq!(result.sorted_prices[2].price, "100.0000");
    Ok(())
}

#[tokio::test]
async fn test_second_round_is_served_from_cache() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![provider("Alpha", "alpha.test")])?;
    let transport = Arc::new(FakeTransport::new(vec![(
        "https://alpha.test/ticker?symbol=BTC",
        json!({"price": "64250.25"}),
    )]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport.clone(), Duration::from_secs(600));

    let first = aggregator.aggregate(Asset::Bitcoin).await;
    let second = aggregator.aggregate(Asset::Bitcoin).await;

    assert_eq!(transport.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(first.sorted_prices[0].price, "64250.2500");
    Ok(())
}

#[tokio::test]
async fn test_expired_cache_triggers_refetch() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![provider("Alpha", "alpha.test")])?;
    let transport = Arc::new(FakeTransport::new(vec![(
        "https://alpha.test/ticker?symbol=BTC",
        json!({"price": "64250.25"}),
    )]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport.clone(), Duration::ZERO);

    let first = aggregator.aggregate(Asset::Bitcoin).await;
    let second = aggregator.aggregate(Asset::Bitcoin).await;

    assert_eq!(transport.calls(), 2);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_assets_are_cached_independently() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![provider("Alpha", "alpha.test")])?;
    let transport = Arc::new(FakeTransport::new(vec![
        ("https://alpha.test/ticker?symbol=BTC", json!({"price": 64250.25})),
        ("https://alpha.test/ticker?symbol=ETH", json!({"price": 3200.5})),
    ]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport.clone(), Duration::from_secs(600));

    assert_eq!(aggregator.aggregate(Asset::Bitcoin).await.sorted_prices[0].price, "64250.2500");
    assert_eq!(aggregator.aggregate(Asset::Ethereum).await.sorted_prices[0].price, "3200.5000");
    assert_eq!(transport.calls(), 2);

    // Repeat rounds for both assets hit the cache.
    aggregator.aggregate(Asset::Bitcoin).await;
    aggregator.aggregate(Asset::Ethereum).await;
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_unavailable_and_never_cached() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::validated(vec![provider("Alpha", "alpha.test")])?;
    let transport = Arc::new(FakeTransport::new(vec![(
        "https://alpha.test/ticker?symbol=BTC",
        json!({"unexpected": true}),
    )]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport.clone(), Duration::from_secs(600));

    assert!(aggregator.aggregate(Asset::Bitcoin).await.is_empty());
    assert!(aggregator.fetcher().cache().is_empty());

    // Nothing was cached, so the next round asks again.
    assert!(aggregator.aggregate(Asset::Bitcoin).await.is_empty());
    assert_eq!(transport.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_fetch_returns_cached_price_without_network() -> Result<()> {
    init_logging();

    let alpha = provider("Alpha", "alpha.test");
    let transport = Arc::new(FakeTransport::new(vec![]));
    let fetcher = QuoteFetcher::new(transport.clone(), QuoteCache::new(Duration::from_secs(600)));
    fetcher.cache().insert("Alpha", Asset::Bitcoin, 42.5);

    let quote = fetcher.fetch(&alpha, Asset::Bitcoin).await;

    assert_eq!(quote, Quote::available("Alpha", 42.5));
    assert_eq!(transport.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_zero_price_is_rejected_and_not_cached() -> Result<()> {
    init_logging();

    let alpha = provider("Alpha", "alpha.test");
    let transport = Arc::new(FakeTransport::new(vec![(
        "https://alpha.test/ticker?symbol=BTC",
        json!({"price": 0.0}),
    )]));
    let fetcher = QuoteFetcher::new(transport, QuoteCache::new(Duration::from_secs(600)));

    let quote = fetcher.fetch(&alpha, Asset::Bitcoin).await;

    assert!(!quote.is_available());
    assert!(fetcher.cache().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_standard_roster_tolerates_total_failure() -> Result<()> {
    init_logging();

    let registry = ProviderRegistry::standard(&ProviderKeys::none())?;
    let transport = Arc::new(FakeTransport::new(vec![]));
    let aggregator =
        PriceAggregator::with_transport(registry, transport, Duration::from_secs(600));

    assert!(aggregator.aggregate(Asset::Bitcoin).await.is_empty());
    assert!(aggregator.aggregate(Asset::Ethereum).await.is_empty());
    Ok(())
}
