//! Price source trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;

/// Trait for price sources.
///
/// Implement this trait to add support for a new upstream. Collectors call
/// [`get_price`](Self::get_price) once per tick; the tracking registry calls
/// [`ensure_supported`](Self::ensure_supported) once when an asset is registered.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricewatch_market_data::{MarketDataError, PriceSource};
///
/// struct FixedSource;
///
/// #[async_trait]
/// impl PriceSource for FixedSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_price(&self, _asset: &str) -> Result<f64, MarketDataError> {
///         Ok(42.0)
///     }
/// }
/// ```
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Unique identifier for this source, e.g. "KRAKEN".
    ///
    /// Used in logs and error payloads.
    fn id(&self) -> &'static str;

    /// Fetch the current price of `asset`, quoted in USD.
    ///
    /// # Errors
    ///
    /// * [`MarketDataError::UnsupportedAsset`] if the symbol cannot be mapped
    /// * [`MarketDataError::SourceUnavailable`] / [`MarketDataError::Network`] on
    ///   transport or decode failures
    /// * [`MarketDataError::NoQuote`] if the source has no current quote
    async fn get_price(&self, asset: &str) -> Result<f64, MarketDataError>;

    /// Check that `asset` can be mapped by this source without fetching a price.
    ///
    /// The default accepts everything and lets the first tick find out.
    async fn ensure_supported(&self, _asset: &str) -> Result<(), MarketDataError> {
        Ok(())
    }
}
