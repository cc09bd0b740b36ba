use crate::errors::AppError;
use crate::models::Record;
use crate::store::RecordStore;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 100;

/// One page of stored records, newest date first. Pages start at 1.
pub async fn list_records(
    store: &dyn RecordStore,
    page: i64,
    per_page: i64,
) -> Result<Vec<Record>, AppError> {
    if page < 1 || per_page < 1 {
        return Err(AppError::Validation(
            "page and per_page must be positive integers".into(),
        ));
    }

    let offset = (page - 1).saturating_mul(per_page);
    let records = store.list(offset, per_page).await?;
    Ok(records)
}
