use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{IngestResult, NewRecord, RowError};
use crate::services::record_normalizer::{normalize_row, RawRow};
use crate::store::{RecordStore, StoreError};

pub const REQUIRED_FIELDS: [&str; 4] = ["date", "season", "medicine", "quantity"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to parse CSV/JSON: {0}")]
    BatchParse(String),

    #[error("CSV must contain date,season,medicine,quantity columns (missing: {})", .missing.join(","))]
    Schema { missing: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An upload as it arrived, before any parsing.
#[derive(Debug, Clone)]
pub enum RawBatch<'a> {
    /// CSV text with a header row.
    Csv(&'a [u8]),
    /// A JSON array of row objects.
    Json(&'a [u8]),
    /// Rows that were already decoded into field mappings.
    Rows(Vec<RawRow>),
}

/// Column names plus rows, in input order.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub columns: BTreeSet<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedBatch {
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let columns = rows.iter().flat_map(|r| r.keys().cloned()).collect();
        Self { columns, rows }
    }
}

pub fn parse_batch(raw: RawBatch<'_>) -> Result<ParsedBatch, IngestError> {
    match raw {
        RawBatch::Csv(bytes) => parse_csv(bytes),
        RawBatch::Json(bytes) => parse_json(bytes),
        RawBatch::Rows(rows) => Ok(ParsedBatch::from_rows(rows)),
    }
}

/// Decode CSV text into rows keyed by the (trimmed) header names.
///
/// Short rows get `Null` for their missing cells; a row wider than the
/// header makes the whole batch unreadable.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedBatch, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::BatchParse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::BatchParse("no columns to parse from file".into()));
    }

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IngestError::BatchParse(e.to_string()))?;

        if record.len() > headers.len() {
            return Err(IngestError::BatchParse(format!(
                "line {}: expected {} fields, saw {}",
                line_num + 2,
                headers.len(),
                record.len()
            )));
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = record
                    .get(i)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null);
                (name.clone(), cell)
            })
            .collect();
        rows.push(row);
    }

    Ok(ParsedBatch {
        columns: headers.into_iter().collect(),
        rows,
    })
}

/// Decode a JSON array of objects. Columns are the union of all object keys.
pub fn parse_json(bytes: &[u8]) -> Result<ParsedBatch, IngestError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| IngestError::BatchParse(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(IngestError::BatchParse(
            "JSON payload must be a list of records".into(),
        ));
    };

    let rows = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(IngestError::BatchParse(format!(
                "element {} is not a record object",
                i
            ))),
        })
        .collect::<Result<Vec<RawRow>, IngestError>>()?;

    Ok(ParsedBatch::from_rows(rows))
}

pub fn check_schema(columns: &BTreeSet<String>) -> Result<(), IngestError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !columns.contains(**field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::Schema { missing })
    }
}

/// Run every row through the normalizer, keeping going past bad rows.
pub fn normalize_batch(rows: &[RawRow]) -> (Vec<NewRecord>, Vec<RowError>) {
    let mut staged = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match normalize_row(row) {
            Ok(record) => staged.push(record),
            Err(e) => {
                warn!("Rejected row {}: {}", idx, e);
                errors.push(RowError {
                    row: idx,
                    error: e.to_string(),
                });
            }
        }
    }

    (staged, errors)
}

/// Parse, schema-check, normalize and store one upload.
///
/// Unreadable batches and missing columns fail before anything is written.
/// Otherwise every valid row is submitted in a single `insert_many`.
pub async fn ingest(store: &dyn RecordStore, raw: RawBatch<'_>) -> Result<IngestResult, IngestError> {
    let batch = parse_batch(raw)?;
    check_schema(&batch.columns)?;

    let (staged, errors) = normalize_batch(&batch.rows);

    let inserted = if staged.is_empty() {
        0
    } else {
        store.insert_many(staged).await?
    };

    info!(
        "Ingest completed: {} rows read, {} inserted, {} rejected",
        batch.rows.len(),
        inserted,
        errors.len()
    );

    Ok(IngestResult { inserted, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, SeasonRow};
    use crate::store::InMemoryRecordStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts `insert_many` calls on top of the in-memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRecordStore,
        insert_calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn insert_many(&self, records: Vec<NewRecord>) -> Result<usize, StoreError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_many(records).await
        }

        async fn query_season(&self, season: &str) -> Result<Vec<SeasonRow>, StoreError> {
            self.inner.query_season(season).await
        }

        async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Record>, StoreError> {
            self.inner.list(offset, limit).await
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_valid_rows() {
        let store = InMemoryRecordStore::new();
        let csv = b"date,season,medicine,quantity\n2022-01-01,Winter,A,10\n2022-01-02,Winter,B,-5\n";

        let result = ingest(&store, RawBatch::Csv(csv)).await.unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(
            result.errors,
            vec![RowError {
                row: 1,
                error: "quantity must be non-negative".into()
            }]
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_nul_row_fails_alone() {
        let store = CountingStore::default();
        let csv = b"date,season,medicine,quantity\n2022-01-01,Winter,A,10\n2022-01-02,Winter,B\0x,5\n2022-01-03,Winter,C,7\n";

        let result = ingest(&store, RawBatch::Csv(csv)).await.unwrap();

        assert_eq!(result.inserted, 2);
        assert_eq!(
            result.errors,
            vec![RowError {
                row: 1,
                error: "season and medicine must not contain NUL characters".into()
            }]
        );
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_quantity_column_is_schema_error() {
        let store = InMemoryRecordStore::new();
        let csv = b"date,season,medicine\n2022-01-01,Winter,A\n";

        let err = ingest(&store, RawBatch::Csv(csv)).await.unwrap_err();

        match err {
            IngestError::Schema { missing } => assert_eq!(missing, vec!["quantity".to_string()]),
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_valid_and_invalid_counts_add_up() {
        for (valid, invalid) in [(0usize, 0usize), (3, 0), (0, 4), (5, 2)] {
            let store = CountingStore::default();
            let mut rows = Vec::new();
            for i in 0..valid {
                rows.push(json!({"date": "2023-01-01", "season": "Winter", "medicine": format!("M{}", i), "quantity": i}));
            }
            for _ in 0..invalid {
                rows.push(json!({"date": "bogus", "season": "Winter", "medicine": "X", "quantity": 1}));
            }
            let body = serde_json::to_vec(&rows).unwrap();

            let result = if rows.is_empty() {
                // an empty list has no columns at all
                let err = ingest(&store, RawBatch::Json(&body)).await.unwrap_err();
                assert!(matches!(err, IngestError::Schema { .. }));
                continue;
            } else {
                ingest(&store, RawBatch::Json(&body)).await.unwrap()
            };

            assert_eq!(result.inserted, valid);
            assert_eq!(result.errors.len(), invalid);
            let expected_calls = usize::from(valid > 0);
            assert_eq!(store.insert_calls.load(Ordering::SeqCst), expected_calls);
        }
    }

    #[tokio::test]
    async fn test_all_rows_invalid_is_not_an_error() {
        let store = CountingStore::default();
        let csv = b"date,season,medicine,quantity\nnope,Winter,A,1\n2022-01-01,,A,1\n";

        let result = ingest(&store, RawBatch::Csv(csv)).await.unwrap();

        assert_eq!(result.inserted, 0);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].row, 0);
        assert_eq!(result.errors[1].row, 1);
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_json_object_is_batch_parse_error() {
        let store = InMemoryRecordStore::new();
        let body = br#"{"date": "2022-01-01", "season": "Winter", "medicine": "A", "quantity": 1}"#;

        let err = ingest(&store, RawBatch::Json(body)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to parse CSV/JSON: JSON payload must be a list of records"
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_json_is_batch_parse_error() {
        assert!(matches!(
            parse_batch(RawBatch::Json(b"[{\"date\": ")),
            Err(IngestError::BatchParse(_))
        ));
        assert!(matches!(
            parse_batch(RawBatch::Json(b"[1, 2]")),
            Err(IngestError::BatchParse(_))
        ));
    }

    #[test]
    fn test_csv_wider_than_header_is_batch_parse_error() {
        let csv = b"date,season,medicine,quantity\n2022-01-01,Winter,A,1,extra\n";
        assert!(matches!(parse_csv(csv), Err(IngestError::BatchParse(_))));
    }

    #[test]
    fn test_empty_csv_is_batch_parse_error() {
        assert!(matches!(parse_csv(b""), Err(IngestError::BatchParse(_))));
    }

    #[test]
    fn test_csv_short_row_fills_nulls() {
        let csv = b"date,season,medicine,quantity\n2022-01-01,Winter\n";
        let batch = parse_csv(csv).unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].get("medicine"), Some(&Value::Null));
        assert_eq!(batch.rows[0].get("quantity"), Some(&Value::Null));

        let (staged, errors) = normalize_batch(&batch.rows);
        assert!(staged.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_csv_headers_are_trimmed() {
        let csv = b"date , season,medicine ,quantity\n2022-01-01,Winter,A,1\n";
        let batch = parse_csv(csv).unwrap();
        assert!(check_schema(&batch.columns).is_ok());
    }

    #[test]
    fn test_json_columns_are_union_of_keys() {
        let body = br#"[
            {"date": "2022-01-01", "season": "Winter"},
            {"medicine": "A", "quantity": 1}
        ]"#;
        let batch = parse_json(body).unwrap();

        assert!(check_schema(&batch.columns).is_ok());
        let (staged, errors) = normalize_batch(&batch.rows);
        assert!(staged.is_empty());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_check_schema_lists_every_missing_field() {
        let columns: BTreeSet<String> = ["date".to_string()].into_iter().collect();
        let err = check_schema(&columns).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV must contain date,season,medicine,quantity columns (missing: season,medicine,quantity)"
        );
    }

    #[tokio::test]
    async fn test_prebuilt_rows_are_accepted() {
        let store = InMemoryRecordStore::new();
        let row = json!({"date": "2024-12-01", "season": "Winter", "medicine": "Paracetamol", "quantity": 120});
        let Value::Object(map) = row else { unreachable!() };

        let result = ingest(&store, RawBatch::Rows(vec![map])).await.unwrap();
        assert_eq!(result.inserted, 1);
        assert!(result.errors.is_empty());
    }
}
