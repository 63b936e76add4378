use futures::future::join_all;
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::collector::{run_collector, CollectorConfig};
use super::errors::TrackingError;
use crate::errors::Result;
use crate::prices::PriceResolver;
use crate::utils::clock::Clock;
use pricewatch_market_data::{PriceSource, RetryClass};

struct TrackedAsset {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Which assets currently have a live collector.
///
/// The map lock is held only while the map itself changes. Collectors are
/// joined after the lock is released.
pub struct TrackingRegistry {
    source: Arc<dyn PriceSource>,
    resolver: Arc<PriceResolver>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown: CancellationToken,
    tracked: Mutex<HashMap<String, TrackedAsset>>,
}

impl TrackingRegistry {
    pub fn new(
        source: Arc<dyn PriceSource>,
        resolver: Arc<PriceResolver>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            resolver,
            clock,
            interval,
            shutdown: CancellationToken::new(),
            tracked: Mutex::new(HashMap::new()),
        }
    }

    fn lock_tracked(&self) -> MutexGuard<'_, HashMap<String, TrackedAsset>> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts collecting `asset`.
    ///
    /// Returns `Ok(false)` if a collector is already running. An asset the
    /// source rejects outright is an error. If the source cannot be reached to
    /// check, the asset is tracked anyway and every tick retries.
    pub async fn register(&self, asset: &str) -> Result<bool> {
        if self.shutdown.is_cancelled() {
            return Err(TrackingError::ShuttingDown.into());
        }
        if self.is_tracked(asset) {
            return Ok(false);
        }

        if let Err(e) = self.source.ensure_supported(asset).await {
            if e.retry_class() == RetryClass::Never {
                return Err(e.into());
            }
            warn!("Could not verify {} with {}: {}", asset, self.source.id(), e);
        }

        let mut tracked = self.lock_tracked();
        // Re-checked under the lock: shutdown_all drains the map under it.
        if self.shutdown.is_cancelled() {
            return Err(TrackingError::ShuttingDown.into());
        }
        if tracked.contains_key(asset) {
            return Ok(false);
        }

        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(run_collector(
            CollectorConfig::new(asset, self.interval),
            Arc::clone(&self.source),
            Arc::clone(&self.resolver),
            Arc::clone(&self.clock),
            cancel.clone(),
        ));
        tracked.insert(asset.to_string(), TrackedAsset { cancel, handle });
        info!("Tracking {}", asset);
        Ok(true)
    }

    /// Stops collecting `asset` and drops its cache entry.
    ///
    /// Returns once the collector has exited, so no write for `asset` can
    /// follow. Returns `false` if the asset was not tracked.
    pub async fn unregister(&self, asset: &str) -> bool {
        let removed = self.lock_tracked().remove(asset);
        let Some(entry) = removed else {
            return false;
        };

        entry.cancel.cancel();
        join_collector(asset, entry.handle).await;
        self.resolver.evict(asset);
        info!("Stopped tracking {}", asset);
        true
    }

    /// Stops every collector and refuses further registrations.
    pub async fn shutdown_all(&self) {
        self.shutdown.cancel();
        let drained: Vec<(String, TrackedAsset)> = self.lock_tracked().drain().collect();
        if drained.is_empty() {
            return;
        }

        let count = drained.len();
        join_all(drained.into_iter().map(|(asset, entry)| async move {
            entry.cancel.cancel();
            join_collector(&asset, entry.handle).await;
        }))
        .await;
        info!("Stopped {} collectors", count);
    }

    /// Tracked assets, sorted.
    pub fn tracked_assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = self.lock_tracked().keys().cloned().collect();
        assets.sort();
        assets
    }

    pub fn is_tracked(&self, asset: &str) -> bool {
        self.lock_tracked().contains_key(asset)
    }

    pub fn len(&self) -> usize {
        self.lock_tracked().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn join_collector(asset: &str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        if e.is_panic() {
            error!("{}", TrackingError::CollectorPanicked(asset.to_string()));
        }
    }
}
