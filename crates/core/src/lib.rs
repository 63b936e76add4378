//! Pricewatch Core - tracked assets, collectors and price resolution.
//!
//! This crate owns the tracked-asset lifecycle and the two-tier price model.
//! It is database-agnostic and defines the [`prices::SampleStore`] trait that is
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod prices;
pub mod tracking;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

pub use prices::{CacheSettings, PriceResolver, RecencyCache, Sample, SampleStore};
pub use tracking::TrackingRegistry;
pub use utils::clock::{Clock, ManualClock, SystemClock};
