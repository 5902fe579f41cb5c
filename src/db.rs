/// Postgres access for the air quality store.
///
/// The `airquality` table keeps one row per state-hour with the raw date
/// components; the timestamp is derived at query time via `make_timestamp`,
/// never stored. There is deliberately no uniqueness constraint on
/// `(state, timestamp)`: the updater's watermark check is the only
/// duplicate guard, and inserting the same reading twice produces two rows.

use chrono::{NaiveDate, NaiveDateTime};
use postgres::{Client, NoTls};
use serde::Serialize;

use crate::config::DbConfig;
use crate::model::{AirQualityError, Pollutant, Reading};

/// Derived timestamp expression shared by every query against `airquality`.
const TIMESTAMP_EXPR: &str = "make_timestamp(year, month, day, utc_hour, 0, 0.0)";

// ---------------------------------------------------------------------------
// Connection and schema
// ---------------------------------------------------------------------------

/// Connect to the store. Connection failure is fatal to the caller's
/// operation; there is no retry.
pub fn connect(config: &DbConfig) -> Result<Client, AirQualityError> {
    Client::connect(&config.connection_string(), NoTls).map_err(|e| {
        AirQualityError::Store(format!(
            "cannot connect to {} on {}: {}",
            config.dbname, config.host, e
        ))
    })
}

/// Create the `airquality` table and its state index if they do not exist.
/// Safe to call on every startup.
pub fn ensure_schema(client: &mut Client) -> Result<(), AirQualityError> {
    client.batch_execute(
        "CREATE TABLE IF NOT EXISTS airquality (
             year     INT NOT NULL,
             month    INT NOT NULL,
             day      INT NOT NULL,
             utc_hour INT NOT NULL,
             pm25     DOUBLE PRECISION,
             pm10     DOUBLE PRECISION,
             state    TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_airquality_state ON airquality (state);",
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Watermark queries
// ---------------------------------------------------------------------------

/// Latest derived timestamp across all states, or `None` for an empty store.
pub fn global_watermark(client: &mut Client) -> Result<Option<NaiveDateTime>, AirQualityError> {
    let sql = format!("SELECT max({}) FROM airquality", TIMESTAMP_EXPR);
    let row = client.query_one(sql.as_str(), &[])?;
    Ok(row.get(0))
}

/// Latest derived timestamp for one state, or `None` if the state has no rows.
pub fn state_watermark(
    client: &mut Client,
    state: &str,
) -> Result<Option<NaiveDateTime>, AirQualityError> {
    let sql = format!("SELECT max({}) FROM airquality WHERE state = $1", TIMESTAMP_EXPR);
    let row = client.query_one(sql.as_str(), &[&state])?;
    Ok(row.get(0))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert one reading. Each insert commits independently; there is no
/// multi-row transaction. Returns the number of rows affected (always 1
/// on success).
pub fn insert_reading(client: &mut Client, reading: &Reading) -> Result<u64, AirQualityError> {
    let affected = client.execute(
        "INSERT INTO airquality (year, month, day, utc_hour, pm25, pm10, state)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
        &[
            &reading.year,
            &reading.month,
            &reading.day,
            &reading.utc_hour,
            &reading.pm25,
            &reading.pm10,
            &reading.state,
        ],
    )?;
    Ok(affected)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// One stored reading projected onto a single pollutant column, as consumed
/// by the chart and map collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantRow {
    pub state: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Fetch all rows whose derived timestamp falls on a date within
/// `[start_date, end_date]` (both date boundaries inclusive, the whole end
/// day included) and whose state is in `states`. Rows are ordered by
/// timestamp for the time-series view. An empty result is valid.
pub fn fetch_rows(
    client: &mut Client,
    start_date: NaiveDate,
    end_date: NaiveDate,
    states: &[String],
    pollutant: Pollutant,
) -> Result<Vec<PollutantRow>, AirQualityError> {
    let start_ts = start_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AirQualityError::Format(format!("invalid start date {}", start_date)))?;
    let end_exclusive = end_date
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AirQualityError::Format(format!("invalid end date {}", end_date)))?;

    // The pollutant column is interpolated, not parameterized; it can only
    // ever be the enum's two fixed column names.
    let sql = format!(
        "SELECT state, {ts} AS ts, {col} FROM airquality
         WHERE {ts} >= $1 AND {ts} < $2 AND state = ANY($3)
         ORDER BY ts",
        ts = TIMESTAMP_EXPR,
        col = pollutant.as_column(),
    );

    let rows = client.query(sql.as_str(), &[&start_ts, &end_exclusive, &states])?;

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        // NULL concentrations surface as NaN and are filtered out by the
        // aggregate layer, the same as in-band NaN sentinels.
        let value: f64 = row.get::<_, Option<f64>>(2).unwrap_or(f64::NAN);
        result.push(PollutantRow {
            state: row.get(0),
            timestamp: row.get(1),
            value,
        });
    }

    Ok(result)
}
