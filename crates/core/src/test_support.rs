//! Shared mocks for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::errors::Result;
use crate::prices::{Sample, SampleStore};
use crate::utils::clock::ManualClock;
use pricewatch_market_data::{MarketDataError, PriceSource};

// =========================================================================
// Mock SampleStore
// =========================================================================

#[derive(Clone, Default)]
pub struct MemoryStore {
    samples: Arc<Mutex<Vec<Sample>>>,
    fail_on_insert: Arc<Mutex<bool>>,
    nearest_calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.lock().unwrap() = fail;
    }

    pub fn add(&self, sample: Sample) {
        self.samples.lock().unwrap().push(sample);
    }

    pub fn all(&self) -> Vec<Sample> {
        self.samples.lock().unwrap().clone()
    }

    pub fn nearest_calls(&self) -> usize {
        self.nearest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn insert_sample(&self, sample: &Sample) -> Result<()> {
        if *self.fail_on_insert.lock().unwrap() {
            return Err(crate::Error::Unexpected("Intentional insert failure".into()));
        }
        self.add(sample.clone());
        Ok(())
    }

    fn nearest_sample(&self, asset: &str, timestamp: i64) -> Result<Option<Sample>> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        let samples = self.samples.lock().unwrap();
        Ok(samples
            .iter()
            .filter(|s| s.asset == asset)
            .min_by_key(|s| (s.distance_to(timestamp), s.timestamp))
            .cloned())
    }

    fn count_samples(&self, asset: &str) -> Result<usize> {
        let samples = self.samples.lock().unwrap();
        Ok(samples.iter().filter(|s| s.asset == asset).count())
    }
}

// =========================================================================
// Mock PriceSource
// =========================================================================

pub enum Step {
    /// Move the clock to `.0` and return price `.1`
    Price(i64, f64),
    Fail,
}

/// Plays back a fixed script, one step per call. Once the script runs out
/// every call fails with `NoQuote`.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    clock: Arc<ManualClock>,
    calls: AtomicUsize,
    supported: Option<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(clock: Arc<ManualClock>, script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            clock,
            calls: AtomicUsize::new(0),
            supported: None,
        }
    }

    pub fn supporting(mut self, assets: &[&str]) -> Self {
        self.supported = Some(assets.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    fn id(&self) -> &'static str {
        "SCRIPTED"
    }

    async fn get_price(&self, asset: &str) -> std::result::Result<f64, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Step::Price(timestamp, price)) => {
                self.clock.set(timestamp);
                Ok(price)
            }
            Some(Step::Fail) => Err(MarketDataError::unavailable("SCRIPTED", "scripted failure")),
            None => Err(MarketDataError::NoQuote {
                provider: "SCRIPTED".to_string(),
                asset: asset.to_string(),
            }),
        }
    }

    async fn ensure_supported(&self, asset: &str) -> std::result::Result<(), MarketDataError> {
        match &self.supported {
            Some(list) if !list.iter().any(|a| a == asset) => {
                Err(MarketDataError::UnsupportedAsset(asset.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Signals when a fetch starts, then holds it until released.
#[derive(Default)]
pub struct GatedSource {
    pub started: Notify,
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for GatedSource {
    fn id(&self) -> &'static str {
        "GATED"
    }

    async fn get_price(&self, _asset: &str) -> std::result::Result<f64, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(1.0)
    }
}

/// Fails `ensure_supported` as if the upstream were down.
pub struct UnreachableSource;

#[async_trait]
impl PriceSource for UnreachableSource {
    fn id(&self) -> &'static str {
        "UNREACHABLE"
    }

    async fn get_price(&self, _asset: &str) -> std::result::Result<f64, MarketDataError> {
        Err(MarketDataError::unavailable("UNREACHABLE", "down"))
    }

    async fn ensure_supported(&self, _asset: &str) -> std::result::Result<(), MarketDataError> {
        Err(MarketDataError::unavailable("UNREACHABLE", "down"))
    }
}
