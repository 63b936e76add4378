//! Durable sample storage trait.
//!
//! The durable store is append-only: samples are never updated or deleted.
//! Retention applies to the cache only.

use async_trait::async_trait;

use super::model::Sample;
use crate::errors::Result;

/// Storage interface for price samples.
///
/// # Design Notes
///
/// - Inserts are async: they go through the storage layer's single writer
/// - Reads are sync and may block; async callers run them on the blocking pool
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Appends one sample.
    async fn insert_sample(&self, sample: &Sample) -> Result<()>;

    /// Returns the sample for `asset` whose timestamp is closest to `timestamp`,
    /// however far away it is. On a tie the earlier sample wins.
    ///
    /// Returns `Ok(None)` if the asset has no samples at all.
    fn nearest_sample(&self, asset: &str, timestamp: i64) -> Result<Option<Sample>>;

    /// Number of stored samples for `asset`.
    fn count_samples(&self, asset: &str) -> Result<usize>;
}
