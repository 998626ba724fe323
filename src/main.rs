use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use price_aggregator::server::{self, AppState};
use price_aggregator::{AggregatorConfig, PriceAggregator};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AggregatorConfig::from_env()?;
    let aggregator = PriceAggregator::new(&config)?;
    tracing::info!(
        "{} providers registered, cache TTL {}s, fetch timeout {}ms",
        aggregator.registry().len(),
        config.cache_ttl_secs,
        config.fetch_timeout_ms
    );

    let state = AppState { aggregator: Arc::new(aggregator) };
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
