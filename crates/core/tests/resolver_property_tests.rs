//! Property-based tests for price resolution and the cache policy.

use async_trait::async_trait;
use pricewatch_core::prices::{CacheSettings, PriceResolver, RecencyCache, Sample, SampleStore};
use pricewatch_core::{ManualClock, Result};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Fixtures
// =============================================================================

const NOW: i64 = 10_000;

#[derive(Default)]
struct VecStore {
    samples: Mutex<Vec<Sample>>,
    nearest_calls: AtomicUsize,
}

impl VecStore {
    fn with_samples(asset: &str, samples: &BTreeMap<i64, f64>) -> Self {
        let store = Self::default();
        store.samples.lock().unwrap().extend(
            samples
                .iter()
                .map(|(ts, price)| Sample::new(asset, *price, *ts)),
        );
        store
    }
}

#[async_trait]
impl SampleStore for VecStore {
    async fn insert_sample(&self, sample: &Sample) -> Result<()> {
        self.samples.lock().unwrap().push(sample.clone());
        Ok(())
    }

    fn nearest_sample(&self, asset: &str, timestamp: i64) -> Result<Option<Sample>> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.asset == asset)
            .min_by_key(|s| (s.distance_to(timestamp), s.timestamp))
            .cloned())
    }

    fn count_samples(&self, asset: &str) -> Result<usize> {
        Ok(self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.asset == asset)
            .count())
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Brute-force reference: minimum distance, earlier timestamp on a tie.
fn expected_nearest(samples: &BTreeMap<i64, f64>, timestamp: i64) -> (i64, f64) {
    samples
        .iter()
        .map(|(ts, price)| (*ts, *price))
        .min_by_key(|(ts, _)| (ts.abs_diff(timestamp), *ts))
        .unwrap()
}

// =============================================================================
// Generators
// =============================================================================

/// Distinct timestamps within retention of `NOW`, with arbitrary prices.
fn arb_samples() -> impl Strategy<Value = BTreeMap<i64, f64>> {
    proptest::collection::btree_map(0i64..NOW, 0.01f64..100_000.0, 1..40)
}

fn arb_hit_window() -> impl Strategy<Value = Option<Duration>> {
    prop_oneof![
        Just(None),
        (0u64..2_000).prop_map(|s| Some(Duration::from_secs(s))),
    ]
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Resolve returns the sample with minimum |timestamp - t|, the earlier
    /// one on a tie, whichever tier answers.
    #[test]
    fn prop_resolve_returns_nearest(
        samples in arb_samples(),
        hit_window in arb_hit_window(),
        queries in proptest::collection::vec(-1_000i64..NOW + 1_000, 1..20),
    ) {
        let rt = runtime();
        let clock = Arc::new(ManualClock::new(NOW));
        let settings = CacheSettings { hit_window, ..CacheSettings::default() };
        let cache = Arc::new(RecencyCache::new(settings, clock));
        let resolver = PriceResolver::new(Arc::new(VecStore::default()), cache);

        rt.block_on(async {
            for (ts, price) in &samples {
                resolver.write(Sample::new("BTC", *price, *ts)).await;
            }
        });

        for t in queries {
            let got = rt.block_on(resolver.resolve("BTC", t)).unwrap();
            let (ts, price) = expected_nearest(&samples, t);
            prop_assert_eq!(got.timestamp, ts);
            prop_assert_eq!(got.price, price);
        }
    }

    /// A durable-served answer is cached; the same query again never reaches
    /// the store.
    #[test]
    fn prop_durable_hit_fills_cache(
        samples in arb_samples(),
        pick in any::<prop::sample::Index>(),
    ) {
        let rt = runtime();
        let clock = Arc::new(ManualClock::new(NOW));
        let store = Arc::new(VecStore::with_samples("BTC", &samples));
        let cache = Arc::new(RecencyCache::new(CacheSettings::default(), clock));
        let resolver = PriceResolver::new(store.clone(), cache.clone());

        let keys: Vec<i64> = samples.keys().copied().collect();
        let t = keys[pick.index(keys.len())];

        prop_assert!(cache.lookup("BTC", t).is_err());
        let first = rt.block_on(resolver.resolve("BTC", t)).unwrap();
        // Served from the cache now, without consulting the store.
        let cached = cache.lookup("BTC", t).unwrap();
        prop_assert_eq!(cached, first);
    }

    /// Durable history the cache never saw still wins when it is nearer,
    /// before and after write-backs from earlier queries.
    #[test]
    fn prop_unseen_history_is_respected(
        history in proptest::collection::btree_map(0i64..6_000, 0.01f64..100_000.0, 1..30),
        live in proptest::collection::btree_map(6_000i64..NOW, 0.01f64..100_000.0, 0..20),
        hit_window in arb_hit_window(),
        queries in proptest::collection::vec(-1_000i64..NOW + 1_000, 1..30),
    ) {
        let rt = runtime();
        let clock = Arc::new(ManualClock::new(NOW));
        let settings = CacheSettings { hit_window, ..CacheSettings::default() };
        let cache = Arc::new(RecencyCache::new(settings, clock));
        let store = Arc::new(VecStore::with_samples("BTC", &history));
        let resolver = PriceResolver::new(store, cache);

        rt.block_on(async {
            for (ts, price) in &live {
                resolver.write(Sample::new("BTC", *price, *ts)).await;
            }
        });

        let mut all = history.clone();
        all.extend(live.iter().map(|(ts, price)| (*ts, *price)));

        for t in queries {
            let got = rt.block_on(resolver.resolve("BTC", t)).unwrap();
            let (ts, price) = expected_nearest(&all, t);
            prop_assert_eq!(got.timestamp, ts);
            prop_assert_eq!(got.price, price);
        }
    }

    /// A write-back answers only a query at its own timestamp, and only while
    /// it is inside retention. Every other query goes back to the store.
    #[test]
    fn prop_write_back_is_limited_to_its_timestamp(
        samples in arb_samples(),
        t in -1_000i64..NOW + 1_000,
    ) {
        const RETENTION: i64 = 5_000;
        let rt = runtime();
        let clock = Arc::new(ManualClock::new(NOW));
        let settings = CacheSettings {
            retention: Duration::from_secs(RETENTION as u64),
            ..CacheSettings::default()
        };
        let cache = Arc::new(RecencyCache::new(settings, clock));
        let store = Arc::new(VecStore::with_samples("BTC", &samples));
        let resolver = PriceResolver::new(store.clone(), cache.clone());

        let first = rt.block_on(resolver.resolve("BTC", t)).unwrap();
        prop_assert_eq!(store.nearest_calls.load(Ordering::SeqCst), 1);

        let retained = first.timestamp >= NOW - RETENTION;
        prop_assert_eq!(cache.lookup("BTC", first.timestamp).is_ok(), retained);
        if t != first.timestamp {
            // Includes every query farther than the hit window from the sample.
            prop_assert!(cache.lookup("BTC", t).is_err());
        }

        let second = rt.block_on(resolver.resolve("BTC", t)).unwrap();
        prop_assert_eq!(second, first.clone());
        let served_from_cache = retained && t == first.timestamp;
        let expected_calls = if served_from_cache { 1 } else { 2 };
        prop_assert_eq!(store.nearest_calls.load(Ordering::SeqCst), expected_calls);
    }

    /// The cache never holds more than `max_assets` distinct assets, and the
    /// ones it keeps are the most recently written.
    #[test]
    fn prop_cache_respects_cap(
        max_assets in 1usize..6,
        writes in proptest::collection::vec(0usize..12, 1..60),
    ) {
        let clock = Arc::new(ManualClock::new(NOW));
        let settings = CacheSettings { max_assets, ..CacheSettings::default() };
        let cache = RecencyCache::new(settings, clock);

        for (i, asset) in writes.iter().enumerate() {
            cache.insert(Sample::new(format!("A{}", asset), 1.0, NOW - i as i64));
            prop_assert!(cache.len() <= max_assets);
        }

        let mut recent: Vec<String> = Vec::new();
        for asset in writes.iter().rev() {
            let name = format!("A{}", asset);
            if !recent.contains(&name) {
                recent.push(name);
            }
            if recent.len() == max_assets {
                break;
            }
        }
        recent.reverse();
        prop_assert_eq!(cache.cached_assets(), recent);
    }
}
