use std::net::SocketAddr;

use anyhow::{ensure, Context, Result};

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub cache_ttl_secs: u64,
    pub fetch_timeout_ms: u64,
    pub bind_addr: SocketAddr,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 600,
            fetch_timeout_ms: 5000,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl AggregatorConfig {
    /// Defaults overridden by CACHE_TTL_SECS, FETCH_TIMEOUT_MS and PORT.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CACHE_TTL_SECS") {
            config.cache_ttl_secs = raw.parse().context("invalid CACHE_TTL_SECS")?;
        }
        if let Ok(raw) = std::env::var("FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = raw.parse().context("invalid FETCH_TIMEOUT_MS")?;
        }
        if let Ok(raw) = std::env::var("PORT") {
            let port: u16 = raw.parse().context("invalid PORT")?;
            config.bind_addr.set_port(port);
        }

        ensure!(config.fetch_timeout_ms > 0, "FETCH_TIMEOUT_MS must be positive");
        Ok(config)
    }
}
