//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for all price source operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching prices from a source.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The asset symbol cannot be mapped to a source identifier.
    /// This is a terminal error - retrying won't help.
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    /// The source could not be reached, returned an error payload, or
    /// returned something we could not parse.
    #[error("Source unavailable: {provider} - {message}")]
    SourceUnavailable {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The source knows the asset but has no current quote for it.
    #[error("No quote from {provider} for {asset}")]
    NoQuote {
        /// The provider that was asked
        provider: String,
        /// The asset symbol that was requested
        asset: String,
    },

    /// A network error occurred while communicating with the source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricewatch_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::UnsupportedAsset("NOPE".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    ///
    /// let error = MarketDataError::NoQuote {
    ///     provider: "KRAKEN".to_string(),
    ///     asset: "BTC".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::NextTick);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::UnsupportedAsset(_) => RetryClass::Never,
            Self::SourceUnavailable { .. } | Self::NoQuote { .. } | Self::Network(_) => {
                RetryClass::NextTick
            }
        }
    }

    /// Shorthand used by providers when wrapping transport or decode failures.
    pub fn unavailable(provider: &str, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
