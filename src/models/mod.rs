mod forecast;
mod ingest;
mod record;

pub use forecast::{Action, ForecastResult, PredictionResponse, YearlyTotal, NO_HISTORY_NOTE};
pub use ingest::{IngestResult, RowError};
pub use record::{NewRecord, Record, SeasonRow};
