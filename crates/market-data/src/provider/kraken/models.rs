//! Kraken public REST API response models.

use serde::Deserialize;
use std::collections::HashMap;

/// Envelope shared by every Kraken public endpoint.
#[derive(Debug, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// One entry of `/0/public/AssetPairs`. Only the fields we filter on.
#[derive(Debug, Deserialize)]
pub struct AssetPairInfo {
    #[serde(default)]
    pub wsname: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub type AssetPairsResult = HashMap<String, AssetPairInfo>;

/// One entry of `/0/public/Ticker`.
///
/// `c` is the last trade closed: `[price, lot volume]`, both as strings.
#[derive(Debug, Deserialize)]
pub struct TickerInfo {
    #[serde(default)]
    pub c: Vec<String>,
}

pub type TickerResult = HashMap<String, TickerInfo>;
