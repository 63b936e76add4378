use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::prices::{PriceResolver, Sample};
use crate::utils::clock::Clock;
use pricewatch_market_data::{PriceSource, RetryClass};

/// Shortest accepted poll interval.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub asset: String,
    pub interval: Duration,
}

impl CollectorConfig {
    pub fn new(asset: impl Into<String>, interval: Duration) -> Self {
        Self {
            asset: asset.into(),
            interval: interval.max(MIN_INTERVAL),
        }
    }
}

/// Polls `source` for one asset until `cancel` fires.
///
/// The first fetch happens one interval after start. A failed fetch is logged
/// and the loop waits for the next tick. Cancellation is checked before every
/// fetch and raced against the fetch itself, so once `cancel` fires no new
/// sample is written. A write that already started is allowed to finish.
pub async fn run_collector(
    config: CollectorConfig,
    source: Arc<dyn PriceSource>,
    resolver: Arc<PriceResolver>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) {
    let CollectorConfig { asset, interval } = config;
    info!(
        "Collector for {} running (every {:?}, source {})",
        asset,
        interval,
        source.id()
    );

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if cancel.is_cancelled() {
            break;
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = source.get_price(&asset) => result,
        };

        match fetched {
            Ok(price) => {
                resolver
                    .write(Sample::new(asset.clone(), price, clock.now_unix()))
                    .await;
            }
            Err(e) if e.retry_class() == RetryClass::Never => {
                error!("Collector for {}: {}", asset, e);
            }
            Err(e) => {
                warn!("Collector for {}: {}, retrying next tick", asset, e);
            }
        }
    }

    info!("Collector for {} stopped", asset);
}
