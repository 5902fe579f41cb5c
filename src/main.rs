//! Scheduled update entry point.
//!
//! Runs one incremental update cycle: load configuration, connect to the
//! store, ensure the schema, scrape all state feeds, and append the rows
//! newer than the watermark. Intended to be invoked by cron or a similar
//! scheduler; takes no arguments.

use std::time::Duration;

use airq_service::logging::{self, DataSource, LogLevel};
use airq_service::update::WatermarkScope;
use airq_service::{config, db, update};

const SETTINGS_PATH: &str = "airq.toml";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let settings = match config::load_settings(SETTINGS_PATH) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    logging::init_logger(LogLevel::Info, settings.log_file.as_deref());

    let db_config = match config::DbConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            logging::error(DataSource::System, None, &e.to_string());
            return 1;
        }
    };

    let mut client = match db::connect(&db_config) {
        Ok(client) => client,
        Err(e) => {
            logging::error(DataSource::Database, None, &e.to_string());
            return 1;
        }
    };

    if let Err(e) = db::ensure_schema(&mut client) {
        logging::error(DataSource::Database, None, &e.to_string());
        return 1;
    }

    let http = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
    {
        Ok(http) => http,
        Err(e) => {
            logging::error(DataSource::System, None, &format!("cannot build HTTP client: {}", e));
            return 1;
        }
    };

    let scope = if settings.per_state_watermark {
        WatermarkScope::PerState
    } else {
        WatermarkScope::Global
    };

    match update::run_update_cycle(&mut client, &http, &settings.feed_base_url, scope) {
        Ok(summary) if summary.states_succeeded == 0 => 1,
        Ok(_) => 0,
        Err(e) => {
            logging::error(DataSource::System, None, &e.to_string());
            1
        }
    }
}
