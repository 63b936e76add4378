//! Bounded recency cache of recent samples.
//!
//! One entry per asset, each holding the asset's samples ordered by timestamp.
//! The cache enforces three independent limits:
//!
//! - **Retention**: samples older than `now - retention` are pruned on every
//!   write and ignored on every read.
//! - **Entry TTL**: an entry that has not been read or written for `entry_ttl`
//!   is dropped.
//! - **Asset cap**: when a new asset pushes the number of entries past
//!   `max_assets`, the least recently touched asset is evicted.
//!
//! An entry only answers queries it can answer exactly as the durable store
//! would. Live writes arrive in timestamp order, so from an entry's first live
//! sample onwards it holds every sample there is; a query at or after that
//! point is covered. A sample written back from the durable store covers only
//! its own timestamp. Anything else is a miss.
//!
//! "Now" comes from the injected [`Clock`]. All operations take one mutex for
//! their whole duration, so each call is atomic with respect to the others.

use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::errors::PriceError;
use super::model::{closer_of, Sample};
use crate::constants::{
    DEFAULT_CACHE_HIT_WINDOW, DEFAULT_CACHE_TTL, DEFAULT_MAX_CACHED_ASSETS, DEFAULT_RETENTION,
};
use crate::utils::clock::Clock;

/// Cache limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub retention: Duration,
    pub entry_ttl: Duration,
    pub max_assets: usize,
    /// Largest distance at which a cached sample answers a query.
    /// `None` removes the limit.
    pub hit_window: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            entry_ttl: DEFAULT_CACHE_TTL,
            max_assets: DEFAULT_MAX_CACHED_ASSETS,
            hit_window: Some(DEFAULT_CACHE_HIT_WINDOW),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    /// timestamp -> price
    samples: BTreeMap<i64, f64>,
    expires_at: i64,
    /// Key of this asset in `CacheState::recency`
    touched: Option<u64>,
    /// Earliest live sample still held. Every sample at or after it is cached.
    live_from: Option<i64>,
}

impl CacheEntry {
    fn prune(&mut self, cutoff: i64) {
        self.samples = self.samples.split_off(&cutoff);
        if self.live_from.is_some_and(|from| from < cutoff) {
            self.live_from = self.samples.keys().next().copied();
        }
    }

    fn covers(&self, timestamp: i64) -> bool {
        self.samples.contains_key(&timestamp)
            || self.live_from.is_some_and(|from| timestamp >= from)
    }

    fn nearest(&self, timestamp: i64) -> Option<(i64, f64)> {
        let before = self
            .samples
            .range(..=timestamp)
            .next_back()
            .map(|(ts, price)| (*ts, *price));
        let after = self
            .samples
            .range(timestamp..)
            .next()
            .map(|(ts, price)| (*ts, *price));
        closer_of(timestamp, before, after)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Touch counter -> asset, oldest first
    recency: BTreeMap<u64, String>,
    next_touch: u64,
}

impl CacheState {
    fn touch(&mut self, asset: &str) {
        let touch = self.next_touch;
        self.next_touch += 1;
        if let Some(entry) = self.entries.get_mut(asset) {
            if let Some(previous) = entry.touched.replace(touch) {
                self.recency.remove(&previous);
            }
            self.recency.insert(touch, asset.to_string());
        }
    }

    fn remove(&mut self, asset: &str) -> bool {
        match self.entries.remove(asset) {
            Some(entry) => {
                if let Some(touched) = entry.touched {
                    self.recency.remove(&touched);
                }
                true
            }
            None => false,
        }
    }

    fn purge_expired(&mut self, now: i64) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(asset, _)| asset.clone())
            .collect();
        for asset in expired {
            debug!("Cache entry for {} expired", asset);
            self.remove(&asset);
        }
    }

    fn least_recent(&self) -> Option<String> {
        self.recency.values().next().cloned()
    }
}

/// In-process recency cache.
pub struct RecencyCache {
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl RecencyCache {
    pub fn new(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(secs(self.settings.retention))
    }

    fn expiry(&self, now: i64) -> i64 {
        now.saturating_add(secs(self.settings.entry_ttl))
    }

    /// Adds a freshly collected `sample` to its asset's entry.
    ///
    /// A sample at an already cached timestamp replaces the old price. A
    /// sample already past retention is dropped, and if that leaves the entry
    /// empty the entry goes too.
    pub fn insert(&self, sample: Sample) {
        self.put(sample, true);
    }

    /// Adds a sample read back from the durable store.
    ///
    /// It answers later queries at its own timestamp only, since the store may
    /// hold neighbours the cache has never seen.
    pub fn write_back(&self, sample: Sample) {
        self.put(sample, false);
    }

    fn put(&self, sample: Sample, live: bool) {
        let now = self.clock.now_unix();
        let cutoff = self.cutoff(now);
        let expires_at = self.expiry(now);
        let mut guard = self.lock();
        let state = &mut *guard;

        state.purge_expired(now);

        let is_new = !state.entries.contains_key(&sample.asset);
        let entry = state
            .entries
            .entry(sample.asset.clone())
            .or_insert_with(|| CacheEntry {
                samples: BTreeMap::new(),
                expires_at,
                touched: None,
                live_from: None,
            });
        entry.samples.insert(sample.timestamp, sample.price);
        entry.prune(cutoff);
        entry.expires_at = expires_at;
        if live && entry.live_from.is_none() && entry.samples.contains_key(&sample.timestamp) {
            entry.live_from = Some(sample.timestamp);
        }

        if entry.samples.is_empty() {
            debug!(
                "Dropping stale sample for {} at {} (cutoff {})",
                sample.asset, sample.timestamp, cutoff
            );
            state.remove(&sample.asset);
            return;
        }

        state.touch(&sample.asset);

        if is_new {
            let cap = self.settings.max_assets.max(1);
            while state.entries.len() > cap {
                let Some(victim) = state.least_recent() else {
                    break;
                };
                debug!("Cache full, evicting {}", victim);
                state.remove(&victim);
            }
        }
    }

    /// Finds the cached sample closest to `timestamp`.
    ///
    /// On a tie the earlier sample wins. A hit refreshes the entry's expiry and
    /// recency.
    ///
    /// # Errors
    ///
    /// [`PriceError::CacheMiss`] when the asset has no live entry, the entry
    /// does not cover `timestamp`, or its nearest sample lies outside the hit
    /// window.
    pub fn lookup(&self, asset: &str, timestamp: i64) -> Result<Sample, PriceError> {
        let now = self.clock.now_unix();
        let cutoff = self.cutoff(now);
        let mut guard = self.lock();
        let state = &mut *guard;

        state.purge_expired(now);

        let Some(entry) = state.entries.get_mut(asset) else {
            return Err(PriceError::CacheMiss);
        };
        entry.prune(cutoff);
        if entry.samples.is_empty() {
            state.remove(asset);
            return Err(PriceError::CacheMiss);
        }

        if !entry.covers(timestamp) {
            return Err(PriceError::CacheMiss);
        }

        let (sampled_at, price) = entry.nearest(timestamp).ok_or(PriceError::CacheMiss)?;
        if let Some(window) = self.settings.hit_window {
            if sampled_at.abs_diff(timestamp) > window.as_secs() {
                return Err(PriceError::CacheMiss);
            }
        }

        entry.expires_at = self.expiry(now);
        state.touch(asset);
        Ok(Sample::new(asset, price, sampled_at))
    }

    /// Drops the asset's entry and recency marker.
    pub fn evict(&self, asset: &str) -> bool {
        self.lock().remove(asset)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now_unix();
        let mut state = self.lock();
        state.purge_expired(now);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, asset: &str) -> bool {
        let now = self.clock.now_unix();
        let mut state = self.lock();
        state.purge_expired(now);
        state.entries.contains_key(asset)
    }

    /// Live assets from least to most recently touched.
    pub fn cached_assets(&self) -> Vec<String> {
        let now = self.clock.now_unix();
        let mut state = self.lock();
        state.purge_expired(now);
        state.recency.values().cloned().collect()
    }
}

fn secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
