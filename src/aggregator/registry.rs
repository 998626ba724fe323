use std::collections::HashSet;

use serde_json::Value;
use url::Url;

use super::extract;
use super::types::Asset;
use crate::error::AggregatorError;

pub type ExtractFn = fn(&Value, &str) -> Option<f64>;

/// Provider-specific symbols, one per supported asset. A provider without a
/// mapping for every asset does not construct.
#[derive(Debug, Clone, Copy)]
pub struct AssetSymbols {
    pub btc: &'static str,
    pub eth: &'static str,
}

impl AssetSymbols {
    pub fn for_asset(&self, asset: Asset) -> &'static str {
        match asset {
            Asset::Bitcoin => self.btc,
            Asset::Ethereum => self.eth,
        }
    }
}

/// One quote source: where to ask, the per-asset symbols to ask with, and
/// the rule that reads a price out of the answer. Rows are fixed at startup
/// and never mutated.
pub struct Provider {
    pub name: &'static str,
    endpoint: String,
    pub symbols: AssetSymbols,
    pub extract: ExtractFn,
}

impl Provider {
    pub fn new(
        name: &'static str,
        endpoint: impl Into<String>,
        symbols: AssetSymbols,
        extract: ExtractFn,
    ) -> Self {
        Self {
            name,
            endpoint: endpoint.into(),
            symbols,
            extract,
        }
    }

    pub fn symbol(&self, asset: Asset) -> &'static str {
        self.symbols.for_asset(asset)
    }

    /// Endpoint with the `{symbol}` placeholder resolved for `asset`.
    pub fn url(&self, asset: Asset) -> String {
        self.endpoint.replace("{symbol}", self.symbol(asset))
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}

/// API keys for the credential-gated providers, normally read from the
/// environment. A missing key disables that provider instead of registering
/// a row that can only fail.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub coinmarketcap: Option<String>,
    pub nomics: Option<String>,
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        Self {
            coinmarketcap: std::env::var("COINMARKETCAP_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            nomics: std::env::var("NOMICS_API_KEY").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// The fixed roster the aggregator fans out over. Order is part of the
/// contract: equal prices keep roster order in the output.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// The standard roster. Adding a provider means adding one row here and
    /// its extraction rule; nothing else changes.
    pub fn standard(keys: &ProviderKeys) -> Result<Self, AggregatorError> {
        let mut providers = Vec::new();

        providers.push(Provider::new(
            "CoinGecko",
            "https://api.coingecko.com/api/v3/simple/price?ids={symbol}&vs_currencies=usd",
            AssetSymbols { btc: "bitcoin", eth: "ethereum" },
            extract::coingecko,
        ));

        if let Some(key) = &keys.coinmarketcap {
            providers.push(Provider::new(
                "CoinMarketCap",
                format!(
                    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest?CMC_PRO_API_KEY={}",
                    key
                ),
                AssetSymbols { btc: "BTC", eth: "ETH" },
                extract::coinmarketcap,
            ));
        } else {
            tracing::warn!("COINMARKETCAP_API_KEY not set; CoinMarketCap provider disabled");
        }

        providers.push(Provider::new(
            "Binance",
            "https://api.binance.com/api/v3/ticker/price?symbol={symbol}",
            AssetSymbols { btc: "BTCUSDT", eth: "ETHUSDT" },
            extract::binance,
        ));

        providers.push(Provider::new(
            "Kraken",
            "https://api.kraken.com/0/public/Ticker?pair={symbol}USD",
            AssetSymbols { btc: "XBT", eth: "ETH" },
            extract::kraken,
        ));

        providers.push(Provider::new(
            "Bitfinex",
            "https://api.bitfinex.com/v2/tickers?symbols=t{symbol}USD",
            AssetSymbols { btc: "BTC", eth: "ETH" },
            extract::bitfinex,
        ));

        providers.push(Provider::new(
            "Coinbase",
            "https://api.coinbase.com/v2/prices/{symbol}/spot",
            AssetSymbols { btc: "BTC-USD", eth: "ETH-USD" },
            extract::coinbase,
        ));

        providers.push(Provider::new(
            "Blockchain.com",
            "https://api.blockchain.com/v3/exchange/tickers/{symbol}",
            AssetSymbols { btc: "BTC-USD", eth: "ETH-USD" },
            extract::blockchain_com,
        ));

        providers.push(Provider::new(
            "CoinPaprika",
            "https://api.coinpaprika.com/v1/tickers/{symbol}",
            AssetSymbols { btc: "btc-bitcoin", eth: "eth-ethereum" },
            extract::coinpaprika,
        ));

        providers.push(Provider::new(
            "CoinCap",
            "https://api.coincap.io/v2/assets/{symbol}",
            AssetSymbols { btc: "bitcoin", eth: "ethereum" },
            extract::coincap,
        ));

        // CoinLore identifies assets by numeric id.
        providers.push(Provider::new(
            "CoinLore",
            "https://api.coinlore.net/api/ticker/?id={symbol}",
            AssetSymbols { btc: "90", eth: "80" },
            extract::coinlore,
        ));

        providers.push(Provider::new(
            "Gemini",
            "https://api.gemini.com/v1/pubticker/{symbol}",
            AssetSymbols { btc: "btcusd", eth: "ethusd" },
            extract::gemini,
        ));

        providers.push(Provider::new(
            "Huobi",
            "https://api.huobi.pro/market/detail/merged?symbol={symbol}",
            AssetSymbols { btc: "btcusdt", eth: "ethusdt" },
            extract::huobi,
        ));

        providers.push(Provider::new(
            "OKX",
            "https://www.okx.com/api/v5/market/ticker?instId={symbol}",
            AssetSymbols { btc: "BTC-USD", eth: "ETH-USD" },
            extract::okx,
        ));

        providers.push(Provider::new(
            "Bittrex",
            "https://api.bittrex.com/v3/markets/{symbol}/ticker",
            AssetSymbols { btc: "BTC-USDT", eth: "ETH-USDT" },
            extract::bittrex,
        ));

        providers.push(Provider::new(
            "Phemex",
            "https://api.phemex.com/v2/exchange/tickers",
            AssetSymbols { btc: "BTCUSDT", eth: "ETHUSDT" },
            extract::phemex,
        ));

        providers.push(Provider::new(
            "CryptoCompare",
            "https://min-api.cryptocompare.com/data/price?fsym={symbol}&tsyms=USD",
            AssetSymbols { btc: "BTC", eth: "ETH" },
            extract::cryptocompare,
        ));

        if let Some(key) = &keys.nomics {
            providers.push(Provider::new(
                "Nomics",
                format!("https://api.nomics.com/v1/currencies/ticker?key={}&ids={{symbol}}", key),
                AssetSymbols { btc: "BTC", eth: "ETH" },
                extract::nomics,
            ));
        } else {
            tracing::warn!("NOMICS_API_KEY not set; Nomics provider disabled");
        }

        providers.push(Provider::new(
            "Messari",
            "https://data.messari.io/api/v1/assets/{symbol}/metrics",
            AssetSymbols { btc: "bitcoin", eth: "ethereum" },
            extract::messari,
        ));

        providers.push(Provider::new(
            "CoinRanking",
            "https://api.coinranking.com/v2/coins",
            AssetSymbols { btc: "BTC", eth: "ETH" },
            extract::coinranking,
        ));

        providers.push(Provider::new(
            "Investing.com",
            "https://api.investing.com/api/cryptocurrencies/{symbol}",
            AssetSymbols { btc: "BTC", eth: "ETH" },
            extract::investing,
        ));

        Self::validated(providers)
    }

    /// Rejects duplicate names and endpoints that do not resolve to an
    /// absolute http(s) URL for every asset. Runs once at startup so a bad
    /// row can never surface mid-request.
    pub fn validated(providers: Vec<Provider>) -> Result<Self, AggregatorError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name) {
                return Err(AggregatorError::DuplicateProvider(provider.name.to_string()));
            }

            for asset in Asset::ALL {
                let url = provider.url(asset);
                let parsed = Url::parse(&url).map_err(|e| {
                    AggregatorError::InvalidEndpoint(format!("{}: {} ({})", provider.name, url, e))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AggregatorError::InvalidEndpoint(format!(
                        "{}: unsupported scheme in {}",
                        provider.name, url
                    )));
                }
            }
        }

        Ok(Self { providers })
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
