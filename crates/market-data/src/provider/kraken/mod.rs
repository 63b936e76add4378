//! Kraken price source.
//!
//! Prices come from Kraken's public REST API, which needs no API key:
//! - `/0/public/AssetPairs` gives the tradable pairs. Only online pairs quoted
//!   in USD are kept, keyed by their base symbol.
//! - `/0/public/Ticker?pair=<id>` gives the last trade for one pair.
//!
//! Kraken still uses a few legacy base symbols (`XBT` for bitcoin, `XDG` for
//! dogecoin). These are remapped so callers can ask for `BTC`.

mod models;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::errors::MarketDataError;
use crate::provider::PriceSource;

use models::{AssetPairsResult, KrakenResponse, TickerResult};

/// Provider ID constant
const PROVIDER_ID: &str = "KRAKEN";

/// Public API host used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Quote currency suffix of the pairs we track
const USD_SUFFIX: &str = "/USD";

/// Kraken legacy base symbols and the names clients use for them.
const LEGACY_SYMBOLS: &[(&str, &str)] = &[("XBT", "BTC"), ("XDG", "DOGE"), ("XXM", "MONERO")];

/// Kraken price source.
///
/// The pair table is fetched on first use. A failed fetch is not remembered,
/// so the next call tries again.
///
/// # Example
///
/// ```ignore
/// use pricewatch_market_data::KrakenProvider;
///
/// let provider = KrakenProvider::new(pricewatch_market_data::provider::kraken::DEFAULT_BASE_URL);
/// let price = provider.get_price("BTC").await?;
/// ```
pub struct KrakenProvider {
    client: Client,
    base_url: String,
    /// Client symbol -> Kraken pair id
    pairs: OnceCell<HashMap<String, String>>,
}

impl KrakenProvider {
    /// Create a provider talking to `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pairs: OnceCell::new(),
        }
    }

    /// Create a provider with an already known pair table.
    pub fn with_pair_table(base_url: impl Into<String>, pairs: HashMap<String, String>) -> Self {
        let mut provider = Self::new(base_url);
        provider.pairs = OnceCell::new_with(Some(pairs));
        provider
    }

    async fn pairs(&self) -> Result<&HashMap<String, String>, MarketDataError> {
        self.pairs.get_or_try_init(|| self.load_pairs()).await
    }

    async fn load_pairs(&self) -> Result<HashMap<String, String>, MarketDataError> {
        let url = format!("{}/0/public/AssetPairs", self.base_url);
        debug!("Loading Kraken asset pairs from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::unavailable(PROVIDER_ID, e.to_string()))?;

        let body: KrakenResponse<AssetPairsResult> = response
            .json()
            .await
            .map_err(|e| MarketDataError::unavailable(PROVIDER_ID, e.to_string()))?;

        if !body.error.is_empty() {
            return Err(MarketDataError::unavailable(
                PROVIDER_ID,
                body.error.join(", "),
            ));
        }

        let result = body
            .result
            .ok_or_else(|| MarketDataError::unavailable(PROVIDER_ID, "missing result"))?;

        let table = build_pair_table(result);
        info!("Loaded {} Kraken USD pairs", table.len());
        Ok(table)
    }
}

/// Reduce the raw `AssetPairs` result to `symbol -> pair id`.
fn build_pair_table(result: AssetPairsResult) -> HashMap<String, String> {
    let mut entries: Vec<_> = result.into_iter().collect();
    // Deterministic winner when two pairs share a base symbol.
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut table = HashMap::new();
    for (pair_id, info) in entries {
        if info.status.as_deref() != Some("online") {
            continue;
        }
        let Some(wsname) = info.wsname.as_deref() else {
            continue;
        };
        if !wsname.ends_with(USD_SUFFIX) {
            continue;
        }
        let parts: Vec<&str> = wsname.split('/').collect();
        if parts.len() != 2 {
            continue;
        }
        table
            .entry(map_legacy_symbol(parts[0]).to_string())
            .or_insert(pair_id);
    }
    table
}

fn map_legacy_symbol(symbol: &str) -> &str {
    LEGACY_SYMBOLS
        .iter()
        .find(|(legacy, _)| *legacy == symbol)
        .map(|(_, mapped)| *mapped)
        .unwrap_or(symbol)
}

/// Pull the last trade price for `pair_id` out of a ticker response.
fn extract_last_trade(
    body: KrakenResponse<TickerResult>,
    pair_id: &str,
    asset: &str,
) -> Result<f64, MarketDataError> {
    if !body.error.is_empty() {
        return Err(MarketDataError::unavailable(
            PROVIDER_ID,
            body.error.join(", "),
        ));
    }

    let no_quote = || MarketDataError::NoQuote {
        provider: PROVIDER_ID.to_string(),
        asset: asset.to_string(),
    };

    let ticker = body
        .result
        .as_ref()
        .and_then(|result| result.get(pair_id))
        .ok_or_else(no_quote)?;
    let last = ticker.c.first().ok_or_else(no_quote)?;

    last.parse::<f64>().map_err(|e| {
        MarketDataError::unavailable(PROVIDER_ID, format!("invalid price {:?}: {}", last, e))
    })
}

#[async_trait]
impl PriceSource for KrakenProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_price(&self, asset: &str) -> Result<f64, MarketDataError> {
        let pairs = self.pairs().await?;
        let pair_id = pairs
            .get(asset)
            .ok_or_else(|| MarketDataError::UnsupportedAsset(asset.to_string()))?;

        let url = format!("{}/0/public/Ticker?pair={}", self.base_url, pair_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::unavailable(PROVIDER_ID, e.to_string()))?;

        let body: KrakenResponse<TickerResult> = response
            .json()
            .await
            .map_err(|e| MarketDataError::unavailable(PROVIDER_ID, e.to_string()))?;

        extract_last_trade(body, pair_id, asset)
    }

    async fn ensure_supported(&self, asset: &str) -> Result<(), MarketDataError> {
        if self.pairs().await?.contains_key(asset) {
            Ok(())
        } else {
            Err(MarketDataError::UnsupportedAsset(asset.to_string()))
        }
    }
}
