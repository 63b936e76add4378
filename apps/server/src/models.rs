use pricewatch_core::Sample;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct AssetRequest {
    #[serde(alias = "coin")]
    pub asset: String,
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct PriceQuery {
    #[serde(alias = "coin")]
    pub asset: String,
    /// Unix seconds. Defaults to the current time.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub asset: String,
    pub price: f64,
    /// The queried timestamp.
    pub timestamp: i64,
    /// Timestamp of the sample that answered the query.
    pub sampled_at: i64,
}

impl PriceResponse {
    pub fn new(sample: Sample, timestamp: i64) -> Self {
        Self {
            asset: sample.asset,
            price: sample.price,
            timestamp,
            sampled_at: sample.timestamp,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct TrackedAssets {
    pub assets: Vec<String>,
}
