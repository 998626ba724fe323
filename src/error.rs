#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Duplicate provider: {0}")]
    DuplicateProvider(String),

    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
}
