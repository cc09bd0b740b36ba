use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One stored observation of a medicine consumed in a season on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Record {
    pub id: Uuid,
    pub date: NaiveDate,
    pub season: String,
    pub medicine: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A row that passed normalization and is waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub season: String,
    pub medicine: String,
    pub quantity: i64,
}

impl Record {
    pub(crate) fn new(input: NewRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: input.date,
            season: input.season,
            medicine: input.medicine,
            quantity: input.quantity,
            created_at: Utc::now(),
        }
    }
}

/// The flat projection the season aggregator works from.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SeasonRow {
    pub date: NaiveDate,
    pub medicine: String,
    pub quantity: i64,
}

impl From<&Record> for SeasonRow {
    fn from(record: &Record) -> Self {
        Self {
            date: record.date,
            medicine: record.medicine.clone(),
            quantity: record.quantity,
        }
    }
}
