use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::NewRecord;

/// One input row: field name to loosely-typed value.
///
/// CSV cells arrive as strings, missing cells and JSON nulls as `Value::Null`.
pub type RawRow = Map<String, Value>;

/// Why a single row was rejected. Never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date from any of the textual forms we accept.
///
/// Date-times keep only their date part, `YYYY-MM` means the first of the
/// month and a bare `YYYY` means January 1st. Years must have four digits.
pub fn parse_flexible_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let s = raw.trim();
    let invalid = || RecordError::Parse(format!("invalid date '{}'", raw));

    if s.is_empty() {
        return Err(invalid());
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .filter(has_four_digit_year)
            .ok_or_else(invalid);
    }

    let candidates = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .chain(
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date()),
        )
        .chain(DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .chain(NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok());

    candidates
        .into_iter()
        .find(has_four_digit_year)
        .ok_or_else(invalid)
}

fn has_four_digit_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Validate one raw row into a record ready for storage.
///
/// Checks run in a fixed order and the first failure wins:
/// date, quantity format, quantity sign, season/medicine presence, then
/// NUL characters. Text of any length is otherwise accepted.
pub fn normalize_row(row: &RawRow) -> Result<NewRecord, RecordError> {
    let date = match row.get("date") {
        Some(Value::String(s)) => parse_flexible_date(s)?,
        other => {
            return Err(RecordError::Parse(format!(
                "invalid date '{}'",
                display_raw(other)
            )))
        }
    };

    let season = coerce_text(row.get("season"));
    let medicine = coerce_text(row.get("medicine"));

    let quantity = coerce_quantity(row.get("quantity"))?;
    if quantity < 0 {
        return Err(RecordError::Validation("quantity must be non-negative".into()));
    }

    if season.is_empty() || medicine.is_empty() {
        return Err(RecordError::Validation(
            "season and medicine must be non-empty".into(),
        ));
    }

    // Postgres text cannot hold NUL; reject here so the row fails alone.
    if season.contains('\0') || medicine.contains('\0') {
        return Err(RecordError::Validation(
            "season and medicine must not contain NUL characters".into(),
        ));
    }

    Ok(NewRecord {
        date,
        season,
        medicine,
        quantity,
    })
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

fn coerce_quantity(value: Option<&Value>) -> Result<i64, RecordError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    };

    parsed.ok_or_else(|| {
        RecordError::Parse(format!("invalid quantity '{}'", display_raw(value)))
    })
}

fn whole_number(f: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; stay strictly inside the range.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.2e18 {
        Some(f as i64)
    } else {
        None
    }
}

fn display_raw(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
