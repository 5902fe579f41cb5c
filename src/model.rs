/// Core data types for the air quality monitoring service.
///
/// This module defines the shared domain model imported by all other modules,
/// plus the pure timestamp composition that gives readings their identity.
/// It performs no I/O.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pollutant columns
// ---------------------------------------------------------------------------

/// The two particulate matter columns reported by the Berkeley Earth feed
/// and stored in the `airquality` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
}

impl Pollutant {
    /// Column name in the `airquality` table.
    pub fn as_column(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
        }
    }

    /// Display label used by the dashboard collaborator.
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
        }
    }

    /// Resolve a dashboard input to a pollutant.
    ///
    /// Missing or unrecognized values fall back to PM2.5, matching the
    /// dashboard's silent-default contract.
    pub fn from_name(name: Option<&str>) -> Pollutant {
        match name {
            Some("pm10") => Pollutant::Pm10,
            _ => Pollutant::Pm25,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate functions
// ---------------------------------------------------------------------------

/// Aggregate applied per state when building the choropleth map table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    Mean,
    Median,
    Min,
    Max,
}

impl AggregateFn {
    /// Resolve a dashboard input to an aggregate function.
    ///
    /// Missing or unrecognized values fall back to the median.
    pub fn from_name(name: Option<&str>) -> AggregateFn {
        match name {
            Some("mean") => AggregateFn::Mean,
            Some("median") => AggregateFn::Median,
            Some("min") => AggregateFn::Min,
            Some("max") => AggregateFn::Max,
            _ => AggregateFn::Median,
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One parsed line of a state feed, before normalization.
///
/// Column order follows the feed: year, month, day, UTC hour, PM2.5, PM10,
/// retrospective flag. The flag marks retrospectively revised rows upstream;
/// normalization discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub utc_hour: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub retrospective: f64,
}

/// A canonical hourly observation for one state.
///
/// `timestamp` is derived from year/month/day/utc_hour with minute and second
/// fixed at zero. `(state, timestamp)` identifies a reading, though the store
/// does not enforce uniqueness (see `db`). Immutable once normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub state: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub utc_hour: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub timestamp: NaiveDateTime,
}

/// Compose the derived hour-resolution timestamp from its four components.
///
/// Returns `None` for an invalid calendar date or hour. The composition is
/// exact and invertible: the resulting timestamp's date and hour equal the
/// inputs, and its minute and second are zero.
pub fn compose_timestamp(year: i32, month: i32, day: i32, utc_hour: i32) -> Option<NaiveDateTime> {
    if month < 0 || day < 0 || utc_hour < 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)?.and_hms_opt(utc_hour as u32, 0, 0)
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when ingesting, storing, or querying readings.
#[derive(Debug, Clone, PartialEq)]
pub enum AirQualityError {
    /// Feed unreachable or non-2xx HTTP response.
    Network(String),
    /// A feed row or field could not be parsed, or a timestamp could not
    /// be composed from its components.
    Format(String),
    /// Database connection or query failure. Fatal to the current
    /// operation, never isolated per state.
    Store(String),
    /// Missing or invalid configuration.
    Config(String),
}

impl std::fmt::Display for AirQualityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AirQualityError::Network(msg) => write!(f, "Network error: {}", msg),
            AirQualityError::Format(msg) => write!(f, "Format error: {}", msg),
            AirQualityError::Store(msg) => write!(f, "Store error: {}", msg),
            AirQualityError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for AirQualityError {}

impl From<reqwest::Error> for AirQualityError {
    fn from(err: reqwest::Error) -> Self {
        AirQualityError::Network(err.to_string())
    }
}

impl From<postgres::Error> for AirQualityError {
    fn from(err: postgres::Error) -> Self {
        AirQualityError::Store(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
