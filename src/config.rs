/// Service configuration.
///
/// Database credentials come from the environment (a `.env` file is loaded
/// if present) and are never embedded in source. Non-secret service
/// settings live in an optional TOML file next to the binary; a missing
/// file means defaults.

use serde::Deserialize;

use crate::ingest::berkeley::BERKELEY_BASE_URL;
use crate::model::AirQualityError;

// ---------------------------------------------------------------------------
// Database credentials
// ---------------------------------------------------------------------------

/// Postgres connection parameters, supplied out-of-band via environment:
/// `AIRQ_DB_HOST`, `AIRQ_DB_USER`, `AIRQ_DB_PASSWORD`, `AIRQ_DB_NAME`,
/// and optionally `AIRQ_DB_PORT` (default 5432).
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl DbConfig {
    /// Load credentials from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self, AirQualityError> {
        dotenv::dotenv().ok();

        let port = match std::env::var("AIRQ_DB_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                AirQualityError::Config(format!("AIRQ_DB_PORT is not a valid port: {:?}", raw))
            })?,
            Err(_) => 5432,
        };

        Ok(DbConfig {
            host: require_env("AIRQ_DB_HOST")?,
            port,
            user: require_env("AIRQ_DB_USER")?,
            password: require_env("AIRQ_DB_PASSWORD")?,
            dbname: require_env("AIRQ_DB_NAME")?,
        })
    }

    /// Key/value connection string for the postgres client.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.user, self.password, self.dbname
        )
    }
}

fn require_env(key: &str) -> Result<String, AirQualityError> {
    std::env::var(key)
        .map_err(|_| AirQualityError::Config(format!("missing environment variable {}", key)))
}

// ---------------------------------------------------------------------------
// Service settings
// ---------------------------------------------------------------------------

/// Non-secret settings, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Root of the per-state feed tree.
    pub feed_base_url: String,
    /// Bound re-scraping by a per-state watermark instead of the single
    /// global one. Off by default: the global watermark matches the
    /// original updater, including its cross-state skip hazard.
    pub per_state_watermark: bool,
    /// HTTP timeout for feed fetches, in seconds.
    pub request_timeout_secs: u64,
    /// Optional log file path, in addition to console output.
    pub log_file: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            feed_base_url: BERKELEY_BASE_URL.to_string(),
            per_state_watermark: false,
            request_timeout_secs: 30,
            log_file: None,
        }
    }
}

/// Load settings from `path`. A missing file yields defaults; an
/// unreadable or malformed file is a configuration error.
pub fn load_settings(path: &str) -> Result<ServiceSettings, AirQualityError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ServiceSettings::default());
        }
        Err(e) => {
            return Err(AirQualityError::Config(format!(
                "cannot read settings file {}: {}",
                path, e
            )));
        }
    };

    toml::from_str(&raw)
        .map_err(|e| AirQualityError::Config(format!("invalid settings file {}: {}", path, e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
