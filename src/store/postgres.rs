use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::record_queries;
use crate::models::{NewRecord, Record, SeasonRow, YearlyTotal};
use crate::store::{RecordStore, StoreError};

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the records table if this database has never been used.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        record_queries::ensure_schema(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<usize, StoreError> {
        let staged: Vec<Record> = records.into_iter().map(Record::new).collect();
        record_queries::insert_many(&self.pool, &staged).await?;
        Ok(staged.len())
    }

    async fn query_season(&self, season: &str) -> Result<Vec<SeasonRow>, StoreError> {
        Ok(record_queries::fetch_by_season(&self.pool, season).await?)
    }

    async fn yearly_totals(&self, season: &str) -> Result<Vec<YearlyTotal>, StoreError> {
        Ok(record_queries::fetch_yearly_totals(&self.pool, season).await?)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Record>, StoreError> {
        Ok(record_queries::fetch_page(&self.pool, offset, limit).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(record_queries::ping(&self.pool).await?)
    }
}
