use thiserror::Error;

/// Errors raised while writing or resolving prices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The cache holds nothing close enough. Internal; triggers the durable fallback.
    #[error("Cache miss")]
    CacheMiss,

    /// Neither tier has any sample for the asset.
    #[error("No price for {asset} near {timestamp}")]
    NotFound { asset: String, timestamp: i64 },

    /// The durable insert failed and the sample was dropped from the store.
    #[error("Durable write failed: {0}")]
    DurableWriteFailed(String),
}
