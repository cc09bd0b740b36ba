use sqlx::PgPool;
use tracing::error;

use crate::models::{Record, SeasonRow, YearlyTotal};

// Season and medicine are unbounded TEXT: any normalized string must fit.
const CREATE_RECORDS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS medicine_records (
        id UUID PRIMARY KEY,
        date DATE NOT NULL,
        season TEXT NOT NULL,
        medicine TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

// SUM over BIGINT is NUMERIC in Postgres; a BIGINT cast fails past i64::MAX.
const YEARLY_TOTALS_BY_SEASON: &str = r#"
    SELECT EXTRACT(YEAR FROM date)::INT AS year,
           medicine,
           SUM(quantity)::DOUBLE PRECISION AS total
    FROM medicine_records
    WHERE season = $1
    GROUP BY 1, 2
    ORDER BY medicine, year
"#;

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_RECORDS_TABLE).execute(pool).await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_medicine_records_season ON medicine_records (season)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn insert_many(pool: &PgPool, items: &[Record]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for (i, r) in items.iter().enumerate() {
        if let Err(e) = sqlx::query(
            "INSERT INTO medicine_records (id, date, season, medicine, quantity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(r.id)
        .bind(r.date)
        .bind(&r.season)
        .bind(&r.medicine)
        .bind(r.quantity)
        .bind(r.created_at)
        .execute(&mut *tx)
        .await
        {
            error!(
                "Failed to insert record {} of {} (medicine: {}, date: {}): {}",
                i + 1,
                items.len(),
                r.medicine,
                r.date,
                e
            );
            return Err(e);
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn fetch_by_season(pool: &PgPool, season: &str) -> Result<Vec<SeasonRow>, sqlx::Error> {
    sqlx::query_as::<_, SeasonRow>(
        "SELECT date, medicine, quantity
         FROM medicine_records
         WHERE season = $1",
    )
    .bind(season)
    .fetch_all(pool)
    .await
}

pub async fn fetch_yearly_totals(pool: &PgPool, season: &str) -> Result<Vec<YearlyTotal>, sqlx::Error> {
    sqlx::query_as::<_, YearlyTotal>(YEARLY_TOTALS_BY_SEASON)
        .bind(season)
        .fetch_all(pool)
        .await
}

/// Cheapest round trip that proves the pool can reach the database.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn fetch_page(pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<Record>, sqlx::Error> {
    sqlx::query_as::<_, Record>(
        "SELECT id, date, season, medicine, quantity, created_at
         FROM medicine_records
         ORDER BY date DESC, created_at DESC
         OFFSET $1
         LIMIT $2",
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
}
