use serde::{Deserialize, Serialize};

/// One price observation for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub asset: String,
    pub price: f64,
    /// Unix seconds
    pub timestamp: i64,
}

impl Sample {
    pub fn new(asset: impl Into<String>, price: f64, timestamp: i64) -> Self {
        Self {
            asset: asset.into(),
            price,
            timestamp,
        }
    }

    /// Absolute distance in seconds between this sample and `timestamp`.
    pub fn distance_to(&self, timestamp: i64) -> u64 {
        self.timestamp.abs_diff(timestamp)
    }
}

/// Pick the closer of the nearest sample at or before `timestamp` and the
/// nearest one at or after it. On a tie the earlier sample wins.
///
/// Both the cache and the SQLite repository narrow the search to these two
/// candidates with an ordered range lookup, then settle it here.
pub fn closer_of<T>(
    timestamp: i64,
    before: Option<(i64, T)>,
    after: Option<(i64, T)>,
) -> Option<(i64, T)> {
    match (before, after) {
        (Some(b), Some(a)) => {
            if a.0.abs_diff(timestamp) < b.0.abs_diff(timestamp) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (Some(b), None) => Some(b),
        (None, a) => a,
    }
}
