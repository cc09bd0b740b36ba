pub mod action_classifier;
pub mod batch_ingest_service;
pub mod forecasting_service;
pub mod prediction_service;
pub mod record_normalizer;
pub mod record_service;
pub mod season_aggregator;
