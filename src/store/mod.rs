use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewRecord, Record, SeasonRow, YearlyTotal};
use crate::services::season_aggregator::group_yearly_totals;

mod memory;
mod postgres;

pub use memory::InMemoryRecordStore;
pub use postgres::PgRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Durable, append-only table of consumption records.
///
/// Implementations own all locking and transaction discipline: a single
/// `insert_many` call must become visible to readers as a whole.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store every record in one batch-visible write, returning how many were committed.
    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<usize, StoreError>;

    /// All rows whose season matches exactly (case-sensitive, untrimmed).
    async fn query_season(&self, season: &str) -> Result<Vec<SeasonRow>, StoreError>;

    /// Per (year, medicine) sums for a season, ordered by medicine then year.
    ///
    /// Stores without native grouping get it computed in memory from `query_season`.
    async fn yearly_totals(&self, season: &str) -> Result<Vec<YearlyTotal>, StoreError> {
        let rows = self.query_season(season).await?;
        Ok(group_yearly_totals(&rows))
    }

    /// Records ordered newest date first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Record>, StoreError>;

    /// Fails when the backing storage cannot be reached.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
