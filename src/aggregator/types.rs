use serde::{Deserialize, Serialize};

use crate::error::AggregatorError;

/// Assets the aggregator serves quotes for, all USD-denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Bitcoin,
    Ethereum,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Bitcoin, Asset::Ethereum];

    pub fn ticker(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "BTC",
            Asset::Ethereum => "ETH",
        }
    }
}

impl std::str::FromStr for Asset {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(Asset::Bitcoin),
            "eth" | "ethereum" => Ok(Asset::Ethereum),
            other => Err(AggregatorError::UnknownAsset(other.to_string())),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ticker())
    }
}

/// One provider's answer for one asset. `price` is `None` whenever the
/// provider was unreachable, timed out, or answered with an unusable body.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub provider: &'static str,
    pub price: Option<f64>,
}

impl Quote {
    pub fn available(provider: &'static str, price: f64) -> Self {
        Self { provider, price: Some(price) }
    }

    pub fn unavailable(provider: &'static str) -> Self {
        Self { provider, price: None }
    }

    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourcePrice {
    pub source: String,
    pub price: String,
}

/// Caller-facing result of one aggregation round, cheapest entry first.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SortedPrices {
    #[serde(rename = "sortedPrices")]
    pub sorted_prices: Vec<SourcePrice>,
}

impl SortedPrices {
    pub fn cheapest(&self) -> Option<&SourcePrice> {
        self.sorted_prices.first()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_prices.is_empty()
    }
}
