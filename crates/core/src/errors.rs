//! Core error types for Pricewatch.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

use crate::prices::PriceError;
use crate::tracking::TrackingError;
use pricewatch_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Price lookup failed: {0}")]
    Price(#[from] PriceError),

    #[error("Tracking failed: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_error_converts_into_root() {
        let err: Error = PriceError::NotFound {
            asset: "ETH".to_string(),
            timestamp: 42,
        }
        .into();
        assert!(matches!(err, Error::Price(PriceError::NotFound { .. })));
        assert_eq!(
            err.to_string(),
            "Price lookup failed: No price for ETH near 42"
        );
    }

    #[test]
    fn test_market_data_error_converts_into_root() {
        let err: Error = MarketDataError::UnsupportedAsset("FOO".to_string()).into();
        assert!(matches!(
            err,
            Error::MarketData(MarketDataError::UnsupportedAsset(_))
        ));
    }
}
