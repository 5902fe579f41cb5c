//! Feed Verification Module
//!
//! Probes every monitored state's feed and reports whether it is reachable
//! and parseable. Use this before pointing the updater at a new mirror or
//! after an upstream layout change.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ingest::berkeley;
use crate::model::AirQualityError;
use crate::states;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    /// Feed reachable, parseable, and non-empty.
    Success,
    /// Feed reachable and parseable but contained no data rows.
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedVerification {
    pub state: String,
    pub status: VerificationStatus,
    pub row_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<FeedVerification>,
    pub working: usize,
    pub empty: usize,
    pub failed: usize,
}

// ============================================================================
// Per-feed Verification
// ============================================================================

pub fn verify_state_feed(
    client: &reqwest::blocking::Client,
    base_url: &str,
    state: &str,
) -> FeedVerification {
    match berkeley::fetch_state_feed(client, base_url, state) {
        Ok(records) if !records.is_empty() => FeedVerification {
            state: state.to_string(),
            status: VerificationStatus::Success,
            row_count: records.len(),
            error_message: None,
        },
        Ok(_) => FeedVerification {
            state: state.to_string(),
            status: VerificationStatus::PartialSuccess,
            row_count: 0,
            error_message: None,
        },
        Err(e) => FeedVerification {
            state: state.to_string(),
            status: VerificationStatus::Failed,
            row_count: 0,
            error_message: Some(e.to_string()),
        },
    }
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(base_url: &str) -> Result<VerificationReport, AirQualityError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AirQualityError::Network(format!("cannot build HTTP client: {}", e)))?;

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::new(),
        working: 0,
        empty: 0,
        failed: 0,
    };

    for state in states::STATE_REGISTRY {
        let result = verify_state_feed(&client, base_url, state.name);

        match result.status {
            VerificationStatus::Success => report.working += 1,
            VerificationStatus::PartialSuccess => report.empty += 1,
            VerificationStatus::Failed => report.failed += 1,
        }

        report.results.push(result);
    }

    Ok(report)
}

pub fn print_summary(report: &VerificationReport) {
    println!("Feed verification at {}", report.timestamp);
    for result in &report.results {
        match result.status {
            VerificationStatus::Success => {
                println!("  {} ... OK ({} rows)", result.state, result.row_count);
            }
            VerificationStatus::PartialSuccess => {
                println!("  {} ... reachable but empty", result.state);
            }
            VerificationStatus::Failed => {
                println!(
                    "  {} ... FAILED: {}",
                    result.state,
                    result.error_message.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
    println!(
        "Summary: {}/{} working, {} empty, {} failed",
        report.working,
        report.results.len(),
        report.empty,
        report.failed
    );
}
