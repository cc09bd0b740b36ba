use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{SeasonRow, YearlyTotal};
use crate::store::{RecordStore, StoreError};

/// Yearly per-medicine totals for exactly `season`.
///
/// The season is matched as given: no trimming, no case folding. An unknown
/// season yields an empty list.
pub async fn aggregate_season(
    store: &dyn RecordStore,
    season: &str,
) -> Result<Vec<YearlyTotal>, StoreError> {
    let totals = store.yearly_totals(season).await?;
    debug!("Season '{}' aggregated into {} yearly totals", season, totals.len());
    Ok(totals)
}

/// Group flat season rows by (calendar year, medicine) and sum their quantities.
///
/// Output is ordered by medicine, then year. Sums are kept in `i128` so any
/// number of non-negative `i64` quantities adds up without wrapping.
pub fn group_yearly_totals(rows: &[SeasonRow]) -> Vec<YearlyTotal> {
    let mut grouped: BTreeMap<(String, i32), i128> = BTreeMap::new();

    for row in rows {
        *grouped
            .entry((row.medicine.clone(), row.date.year()))
            .or_insert(0) += i128::from(row.quantity);
    }

    grouped
        .into_iter()
        .map(|((medicine, year), total)| YearlyTotal {
            year,
            medicine,
            total: total as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRecord;
    use crate::store::InMemoryRecordStore;
    use chrono::NaiveDate;

    fn season_row(y: i32, m: u32, d: u32, medicine: &str, quantity: i64) -> SeasonRow {
        SeasonRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            medicine: medicine.to_string(),
            quantity,
        }
    }

    fn winter(y: i32, medicine: &str, quantity: i64) -> NewRecord {
        NewRecord {
            date: NaiveDate::from_ymd_opt(y, 12, 1).unwrap(),
            season: "Winter".to_string(),
            medicine: medicine.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_group_sums_same_year_and_medicine() {
        let rows = vec![
            season_row(2023, 1, 5, "Paracetamol", 40),
            season_row(2023, 1, 5, "Paracetamol", 60),
            season_row(2023, 12, 31, "Ibuprofen", 7),
            season_row(2024, 1, 1, "Paracetamol", 120),
        ];

        let totals = group_yearly_totals(&rows);
        assert_eq!(
            totals,
            vec![
                YearlyTotal { year: 2023, medicine: "Ibuprofen".into(), total: 7.0 },
                YearlyTotal { year: 2023, medicine: "Paracetamol".into(), total: 100.0 },
                YearlyTotal { year: 2024, medicine: "Paracetamol".into(), total: 120.0 },
            ]
        );
    }

    #[test]
    fn test_group_sums_past_i64_max() {
        let rows = vec![
            season_row(2023, 1, 1, "A", 5_000_000_000_000_000_000),
            season_row(2023, 1, 1, "A", 5_000_000_000_000_000_000),
            season_row(2023, 6, 1, "A", i64::MAX),
        ];

        let totals = group_yearly_totals(&rows);
        assert_eq!(totals.len(), 1);
        let expected = 10_000_000_000_000_000_000_i128 + i128::from(i64::MAX);
        assert_eq!(totals[0].total, expected as f64);
        assert!(totals[0].total > i64::MAX as f64);
    }

    #[tokio::test]
    async fn test_aggregate_large_quantities_through_store() {
        let store = InMemoryRecordStore::new();
        store
            .insert_many(vec![
                winter(2023, "A", 5_000_000_000_000_000_000),
                winter(2023, "A", 5_000_000_000_000_000_000),
            ])
            .await
            .unwrap();

        let totals = aggregate_season(&store, "Winter").await.unwrap();
        assert_eq!(totals[0].total, 1e19);
    }

    #[test]
    fn test_group_empty_input() {
        assert!(group_yearly_totals(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_season_is_empty_not_error() {
        let store = InMemoryRecordStore::new();
        store.insert_many(vec![winter(2023, "A", 1)]).await.unwrap();

        let totals = aggregate_season(&store, "Monsoon").await.unwrap();
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn test_season_match_is_case_sensitive_and_untrimmed() {
        let store = InMemoryRecordStore::new();
        store.insert_many(vec![winter(2023, "A", 10)]).await.unwrap();

        assert_eq!(aggregate_season(&store, "Winter").await.unwrap().len(), 1);
        assert!(aggregate_season(&store, "winter").await.unwrap().is_empty());
        assert!(aggregate_season(&store, " Winter").await.unwrap().is_empty());
    }
}
