/// Berkeley Earth Air Quality Feed Client
///
/// Retrieves per-state hourly particulate matter data from the Berkeley
/// Earth air quality archive. Each state publishes one plain-text file of
/// hourly rows:
///
///   year  month  day  utc_hour  pm25  pm10  retrospective
///
/// Lines beginning with '%' are header/comment lines and are skipped, as
/// are blank lines. Every remaining line must carry exactly seven
/// whitespace- or tab-delimited fields; a malformed or short line fails the
/// whole fetch for that state, with no partial-line recovery.
///
/// Archive layout: http://berkeleyearth.lbl.gov/air-quality/maps/cities/

use crate::model::{compose_timestamp, AirQualityError, RawRecord, Reading};

/// Root of the per-state feed tree. One file per state at
/// `{base}/{state}/{state}.txt`.
pub const BERKELEY_BASE_URL: &str =
    "http://berkeleyearth.lbl.gov/air-quality/maps/cities/United_States";

/// Number of data fields per feed line.
const FEED_COLUMNS: usize = 7;

/// Comment prefix for feed header lines.
const COMMENT_PREFIX: char = '%';

// ============================================================================
// Feed Client
// ============================================================================

/// Feed URL for a state's hourly text file.
pub fn feed_url(base_url: &str, state: &str) -> String {
    format!("{}/{}/{}.txt", base_url, state, state)
}

/// Fetch and parse one state's feed.
///
/// # Parameters
/// - `client`: HTTP client
/// - `base_url`: feed tree root (normally `BERKELEY_BASE_URL`)
/// - `state`: canonical state identifier (e.g. "Iowa", "New_Hampshire")
///
/// # Returns
/// All rows of the feed, in feed order (oldest first). No retry on failure.
pub fn fetch_state_feed(
    client: &reqwest::blocking::Client,
    base_url: &str,
    state: &str,
) -> Result<Vec<RawRecord>, AirQualityError> {
    let url = feed_url(base_url, state);

    let response = client
        .get(&url)
        .send()
        .map_err(|e| AirQualityError::Network(format!("feed fetch for {} failed: {}", state, e)))?;

    if !response.status().is_success() {
        return Err(AirQualityError::Network(format!(
            "feed for {} returned HTTP {}",
            state,
            response.status()
        )));
    }

    let text = response
        .text()
        .map_err(|e| AirQualityError::Network(format!("feed body for {} unreadable: {}", state, e)))?;

    parse_feed(&text)
}

// ============================================================================
// Feed Parsing
// ============================================================================

/// Parse a raw feed body into records.
///
/// Skips '%'-prefixed and blank lines; any other malformed line fails the
/// whole parse.
pub fn parse_feed(text: &str) -> Result<Vec<RawRecord>, AirQualityError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        records.push(parse_line(line, i + 1)?);
    }

    Ok(records)
}

fn parse_line(line: &str, line_number: usize) -> Result<RawRecord, AirQualityError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() != FEED_COLUMNS {
        return Err(AirQualityError::Format(format!(
            "line {}: expected {} fields, found {}",
            line_number,
            FEED_COLUMNS,
            fields.len()
        )));
    }

    let int_field = |idx: usize, name: &str| -> Result<i32, AirQualityError> {
        fields[idx].parse::<i32>().map_err(|_| {
            AirQualityError::Format(format!(
                "line {}: unparseable {} value {:?}",
                line_number, name, fields[idx]
            ))
        })
    };

    // Concentrations may be "NaN" in the feed; f64 parsing accepts that
    // and the sentinel is filtered out at aggregation time.
    let float_field = |idx: usize, name: &str| -> Result<f64, AirQualityError> {
        fields[idx].parse::<f64>().map_err(|_| {
            AirQualityError::Format(format!(
                "line {}: unparseable {} value {:?}",
                line_number, name, fields[idx]
            ))
        })
    };

    Ok(RawRecord {
        year: int_field(0, "year")?,
        month: int_field(1, "month")?,
        day: int_field(2, "day")?,
        utc_hour: int_field(3, "utc_hour")?,
        pm25: float_field(4, "pm25")?,
        pm10: float_field(5, "pm10")?,
        retrospective: float_field(6, "retrospective")?,
    })
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize one raw record into a canonical reading for `state`.
///
/// Derives the hour-resolution timestamp and drops the retrospective flag.
/// Pure; fails only when the date components do not form a valid instant.
pub fn normalize(state: &str, raw: &RawRecord) -> Result<Reading, AirQualityError> {
    let timestamp = compose_timestamp(raw.year, raw.month, raw.day, raw.utc_hour).ok_or_else(|| {
        AirQualityError::Format(format!(
            "invalid date components for {}: {}-{}-{} hour {}",
            state, raw.year, raw.month, raw.day, raw.utc_hour
        ))
    })?;

    Ok(Reading {
        state: state.to_string(),
        year: raw.year,
        month: raw.month,
        day: raw.day,
        utc_hour: raw.utc_hour,
        pm25: raw.pm25,
        pm10: raw.pm10,
        timestamp,
    })
}

/// Normalize a whole feed's records, preserving order.
pub fn normalize_all(state: &str, raws: &[RawRecord]) -> Result<Vec<Reading>, AirQualityError> {
    raws.iter().map(|raw| normalize(state, raw)).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE_FEED: &str = "\
% Berkeley Earth air quality data
% Region: Iowa
%
% year month day utc_hour pm25 pm10 retrospective
2021\t1\t1\t0\t5.0\t10.0\t0
2021\t1\t1\t1\t6.0\t11.0\t0
2021 1 1 2 7.5 NaN 1
";

    #[test]
    fn test_parse_feed_skips_comments_and_blank_lines() {
        let records = parse_feed(SAMPLE_FEED).expect("sample feed should parse");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].year, 2021);
        assert_eq!(records[0].utc_hour, 0);
        assert_eq!(records[0].pm25, 5.0);
        assert_eq!(records[1].pm10, 11.0);
    }

    #[test]
    fn test_parse_feed_accepts_nan_concentrations() {
        let records = parse_feed(SAMPLE_FEED).expect("sample feed should parse");
        assert!(records[2].pm10.is_nan());
        assert_eq!(records[2].retrospective, 1.0);
    }

    #[test]
    fn test_short_line_fails_whole_parse() {
        let feed = "% header\n2021 1 1 0 5.0 10.0 0\n2021 1 1 1 6.0\n";
        let result = parse_feed(feed);
        assert!(matches!(result, Err(AirQualityError::Format(_))));
    }

    #[test]
    fn test_unparseable_field_fails_whole_parse() {
        let feed = "2021 1 1 zero 5.0 10.0 0\n";
        let err = parse_feed(feed).unwrap_err();
        match err {
            AirQualityError::Format(msg) => assert!(msg.contains("utc_hour")),
            other => panic!("expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_feed_of_only_comments_is_empty() {
        let records = parse_feed("% nothing here\n%\n").expect("should parse");
        assert!(records.is_empty());
    }

    #[test]
    fn test_normalize_derives_timestamp_and_drops_flag() {
        let raw = RawRecord {
            year: 2021,
            month: 3,
            day: 14,
            utc_hour: 15,
            pm25: 8.2,
            pm10: 17.9,
            retrospective: 1.0,
        };
        let reading = normalize("Iowa", &raw).expect("valid record should normalize");

        assert_eq!(reading.state, "Iowa");
        assert_eq!(reading.timestamp.year(), 2021);
        assert_eq!(reading.timestamp.month(), 3);
        assert_eq!(reading.timestamp.day(), 14);
        assert_eq!(reading.timestamp.hour(), 15);
        assert_eq!(reading.timestamp.minute(), 0);
        assert_eq!(reading.timestamp.second(), 0);
        assert_eq!(reading.pm25, 8.2);
    }

    #[test]
    fn test_normalize_rejects_impossible_date() {
        let raw = RawRecord {
            year: 2021,
            month: 2,
            day: 30,
            utc_hour: 0,
            pm25: 1.0,
            pm10: 2.0,
            retrospective: 0.0,
        };
        assert!(matches!(normalize("Ohio", &raw), Err(AirQualityError::Format(_))));
    }

    #[test]
    fn test_feed_url_layout() {
        assert_eq!(
            feed_url(BERKELEY_BASE_URL, "New_Hampshire"),
            "http://berkeleyearth.lbl.gov/air-quality/maps/cities/United_States/New_Hampshire/New_Hampshire.txt"
        );
    }
}
