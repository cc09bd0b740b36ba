pub(crate) mod health;
pub(crate) mod predictions;
pub(crate) mod records;
pub(crate) mod uploads;
