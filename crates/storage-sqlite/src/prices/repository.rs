use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{NewPriceSampleDB, PriceSampleDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::price_samples::dsl as samples_dsl;
use pricewatch_core::prices::model::closer_of;
use pricewatch_core::prices::{Sample, SampleStore};
use pricewatch_core::Result;

/// Durable sample store on SQLite.
///
/// Writes go through the single writer; reads take a pooled connection.
pub struct SampleRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SampleRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SampleStore for SampleRepository {
    async fn insert_sample(&self, sample: &Sample) -> Result<()> {
        let row = NewPriceSampleDB::from(sample);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(samples_dsl::price_samples)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    /// Two index range scans on `(asset, timestamp)`: the latest sample at or
    /// before `timestamp` and the earliest at or after it. The closer one wins,
    /// the earlier on a tie.
    fn nearest_sample(&self, asset: &str, timestamp: i64) -> Result<Option<Sample>> {
        let mut conn = get_connection(&self.pool)?;

        let before = samples_dsl::price_samples
            .filter(samples_dsl::asset.eq(asset))
            .filter(samples_dsl::timestamp.le(timestamp))
            .order((samples_dsl::timestamp.desc(), samples_dsl::id.asc()))
            .select(PriceSampleDB::as_select())
            .first::<PriceSampleDB>(&mut conn)
            .optional()
            .into_core()?;

        let after = samples_dsl::price_samples
            .filter(samples_dsl::asset.eq(asset))
            .filter(samples_dsl::timestamp.ge(timestamp))
            .order((samples_dsl::timestamp.asc(), samples_dsl::id.asc()))
            .select(PriceSampleDB::as_select())
            .first::<PriceSampleDB>(&mut conn)
            .optional()
            .into_core()?;

        let nearest = closer_of(
            timestamp,
            before.map(|row| (row.timestamp, row)),
            after.map(|row| (row.timestamp, row)),
        );
        Ok(nearest.map(|(_, row)| row.into()))
    }

    fn count_samples(&self, asset: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = samples_dsl::price_samples
            .filter(samples_dsl::asset.eq(asset))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
