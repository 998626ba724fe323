pub mod aggregator;
pub mod config;
pub mod error;
pub mod server;

pub use aggregator::PriceAggregator;
pub use config::AggregatorConfig;
pub use error::AggregatorError;
