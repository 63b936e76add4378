//! Database models for price samples.

use diesel::prelude::*;

use pricewatch_core::prices::Sample;

/// Stored price sample row
#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::price_samples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceSampleDB {
    pub id: i32,
    pub asset: String,
    pub price: f64,
    pub timestamp: i64,
}

/// Row to insert; `id` is assigned by SQLite
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::price_samples)]
pub struct NewPriceSampleDB {
    pub asset: String,
    pub price: f64,
    pub timestamp: i64,
}

impl From<&Sample> for NewPriceSampleDB {
    fn from(sample: &Sample) -> Self {
        Self {
            asset: sample.asset.clone(),
            price: sample.price,
            timestamp: sample.timestamp,
        }
    }
}

impl From<PriceSampleDB> for Sample {
    fn from(row: PriceSampleDB) -> Self {
        Sample::new(row.asset, row.price, row.timestamp)
    }
}
