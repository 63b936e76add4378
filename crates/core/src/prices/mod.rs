//! Price samples and their two-tier storage.
//!
//! - [`model`] - The [`Sample`] record
//! - [`store`] - Durable store trait, implemented by `storage-sqlite`
//! - [`cache`] - Bounded in-process recency cache
//! - [`resolver`] - Write path and nearest-timestamp resolution across both tiers
//! - [`errors`] - Price-specific errors
//!
//! # Architecture
//!
//! ```text
//!  Collector ──write──▶ PriceResolver ──insert──▶ SampleStore (durable)
//!                             │
//!                             └──insert──▶ RecencyCache (bounded)
//!
//!  Query ──resolve──▶ PriceResolver ──lookup──▶ RecencyCache
//!                             │ CacheMiss
//!                             └──nearest──▶ SampleStore ──write-back──▶ RecencyCache
//! ```

pub mod cache;
pub mod errors;
pub mod model;
pub mod resolver;
pub mod store;


pub use cache::{CacheSettings, RecencyCache};
pub use errors::PriceError;
pub use model::Sample;
pub use resolver::PriceResolver;
pub use store::SampleStore;
