use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::types::{Asset, SortedPrices};
use crate::aggregator::PriceAggregator;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<PriceAggregator>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/bitcoin-prices", get(bitcoin_prices))
        .route("/ethereum-prices", get(ethereum_prices))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// Both routes answer 200 with a JSON body even when every provider failed;
// an empty list is the degraded result, not an error.
async fn bitcoin_prices(State(state): State<AppState>) -> Json<SortedPrices> {
    Json(state.aggregator.aggregate(Asset::Bitcoin).await)
}

async fn ethereum_prices(State(state): State<AppState>) -> Json<SortedPrices> {
    Json(state.aggregator.aggregate(Asset::Ethereum).await)
}
