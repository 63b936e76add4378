use log::{debug, warn};
use std::sync::Arc;

use super::cache::RecencyCache;
use super::errors::PriceError;
use super::model::Sample;
use super::store::SampleStore;
use crate::errors::{Error, Result};

/// Write path and nearest-timestamp resolution across the cache and the
/// durable store.
pub struct PriceResolver {
    store: Arc<dyn SampleStore>,
    cache: Arc<RecencyCache>,
}

impl PriceResolver {
    pub fn new(store: Arc<dyn SampleStore>, cache: Arc<RecencyCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &Arc<RecencyCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn SampleStore> {
        &self.store
    }

    /// Persists `sample` and adds it to the cache.
    ///
    /// A failed durable insert is logged and the sample is kept in the cache
    /// only. Nothing is returned to the caller.
    pub async fn write(&self, sample: Sample) {
        if let Err(e) = self.store.insert_sample(&sample).await {
            let err = PriceError::DurableWriteFailed(e.to_string());
            warn!(
                "Dropping {} sample at {} from durable store: {}",
                sample.asset, sample.timestamp, err
            );
        }
        self.cache.insert(sample);
    }

    /// Returns the known sample closest to `timestamp`.
    ///
    /// The cache answers first. On a miss the durable store is asked for its
    /// nearest sample, however far away, and the result is written back to the
    /// cache, where it answers later queries at its own timestamp.
    ///
    /// # Errors
    ///
    /// [`PriceError::NotFound`] if the asset has no samples anywhere. Store
    /// failures are passed through.
    pub async fn resolve(&self, asset: &str, timestamp: i64) -> Result<Sample> {
        match self.cache.lookup(asset, timestamp) {
            Ok(sample) => return Ok(sample),
            Err(PriceError::CacheMiss) => {
                debug!("Cache miss for {} at {}", asset, timestamp);
            }
            Err(e) => return Err(e.into()),
        }

        let store = Arc::clone(&self.store);
        let key = asset.to_string();
        let found = tokio::task::spawn_blocking(move || store.nearest_sample(&key, timestamp))
            .await
            .map_err(|e| Error::Unexpected(format!("Durable lookup task failed: {}", e)))??;

        match found {
            Some(sample) => {
                self.cache.write_back(sample.clone());
                Ok(sample)
            }
            None => Err(PriceError::NotFound {
                asset: asset.to_string(),
                timestamp,
            }
            .into()),
        }
    }

    /// Drops the asset's cache entry. Durable history is kept.
    pub fn evict(&self, asset: &str) -> bool {
        self.cache.evict(asset)
    }
}
