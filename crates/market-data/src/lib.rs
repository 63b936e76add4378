//! Pricewatch Market Data Crate
//!
//! This crate provides the price source contract consumed by the collectors,
//! and its Kraken implementation.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |    Collector     |  (one per tracked asset, in pricewatch-core)
//! +------------------+
//!          |
//!          v  get_price("BTC")
//! +------------------+
//! |   PriceSource    |  (trait)
//! +------------------+
//!          |
//!          v  symbol -> pair id
//! +------------------+
//! |  KrakenProvider  |  (public REST API)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceSource`] - Fetch the current price of an asset
//! - [`MarketDataError`] - Failures, classified by [`RetryClass`]
//! - [`KrakenProvider`] - Kraken public ticker

pub mod errors;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use provider::kraken::KrakenProvider;
pub use provider::PriceSource;
