//! Air quality monitoring service core.
//!
//! Scrapes per-state hourly PM2.5/PM10 readings from the Berkeley Earth
//! feeds, appends the new rows to a Postgres `airquality` table, and
//! answers dashboard queries with a raw row set plus an aggregated-by-state
//! map table. Chart and map rendering live outside this crate.

pub mod analysis;
pub mod config;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod query;
pub mod states;
pub mod update;
pub mod verify;
