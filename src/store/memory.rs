use async_trait::async_trait;
use parking_lot::RwLock;

use crate::models::{NewRecord, Record, SeasonRow};
use crate::store::{RecordStore, StoreError};

/// Process-local store used by tests and by `STORE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<usize, StoreError> {
        let staged: Vec<Record> = records.into_iter().map(Record::new).collect();
        let count = staged.len();

        // One write lock for the whole batch so readers never see half of it.
        self.records.write().extend(staged);
        Ok(count)
    }

    async fn query_season(&self, season: &str) -> Result<Vec<SeasonRow>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.season == season)
            .map(SeasonRow::from)
            .collect())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Record>, StoreError> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        let records = self.records.read();
        let end = offset.saturating_add(limit).min(records.len());
        if offset >= end {
            return Ok(Vec::new());
        }

        // Order references only, then clone just the requested page.
        let mut ordered: Vec<&Record> = records.iter().collect();
        let newest_first =
            |a: &&Record, b: &&Record| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at));
        if end < ordered.len() {
            ordered.select_nth_unstable_by(end, newest_first);
            ordered.truncate(end);
        }
        ordered.sort_by(newest_first);

        Ok(ordered[offset..end].iter().map(|r| (*r).clone()).collect())
    }
}
