//! Seasonal medicine demand forecasting backend.
//!
//! Uploads of historical consumption records (date, season, medicine,
//! quantity) are validated row by row and stored; forecasts project each
//! medicine's next-season demand from its year-over-year growth and attach a
//! restock recommendation.

pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
