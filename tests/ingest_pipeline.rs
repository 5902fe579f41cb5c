/// Offline pipeline tests: feed text → parse → normalize → delta-select →
/// aggregate. No network or database required; these run everywhere.

use airq_service::analysis::grouping;
use airq_service::ingest::berkeley;
use airq_service::model::{compose_timestamp, AggregateFn};
use airq_service::query::{self, ChartGrouping, QueryFilter};
use airq_service::update::select_newer;
use chrono::NaiveDate;

/// A feed body in the upstream layout: '%' header lines, then
/// tab-delimited year/month/day/utc_hour/pm25/pm10/retrospective rows.
const IOWA_FEED: &str = "\
% Berkeley Earth air quality data
% Region: Iowa
% Fields: year, month, day, UTC hour, PM2.5, PM10, retrospective
%
2021\t1\t1\t0\t5.0\t10.0\t0
2021\t1\t1\t1\t6.0\t11.0\t0
";

#[test]
fn test_feed_to_delta_pipeline() {
    // Iowa scenario: watermark 2021-01-01T00 keeps only the hour-1 row.
    let raws = berkeley::parse_feed(IOWA_FEED).expect("feed should parse");
    assert_eq!(raws.len(), 2);

    let readings = berkeley::normalize_all("Iowa", &raws).expect("rows should normalize");
    let watermark = compose_timestamp(2021, 1, 1, 0);
    let fresh = select_newer(readings, watermark);

    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].state, "Iowa");
    assert_eq!(fresh[0].timestamp, compose_timestamp(2021, 1, 1, 1).unwrap());
    assert_eq!(fresh[0].pm25, 6.0);
    assert_eq!(fresh[0].pm10, 11.0);
}

#[test]
fn test_empty_delta_is_not_an_error() {
    let raws = berkeley::parse_feed(IOWA_FEED).expect("feed should parse");
    let readings = berkeley::normalize_all("Iowa", &raws).expect("rows should normalize");

    // Watermark already past the whole feed: nothing new this cycle.
    let fresh = select_newer(readings, compose_timestamp(2021, 1, 1, 1));
    assert!(fresh.is_empty());
}

#[test]
fn test_two_state_mean_scenario() {
    // Iowa {5.0, 7.0}, Ohio {3.0} under mean ⇒ {Iowa: 6.0, Ohio: 3.0}.
    let rows = vec![
        pollutant_row("Iowa", 0, 5.0),
        pollutant_row("Iowa", 1, 7.0),
        pollutant_row("Ohio", 0, 3.0),
    ];

    let table = query::aggregate_by_state(&rows, AggregateFn::Mean);
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].state, "Iowa");
    assert_eq!(table[0].value, 6.0);
    assert_eq!(table[1].state, "Ohio");
    assert_eq!(table[1].value, 3.0);
}

#[test]
fn test_aggregate_equals_function_of_each_states_raw_rows() {
    let rows = vec![
        pollutant_row("Iowa", 0, 9.0),
        pollutant_row("Iowa", 1, 1.0),
        pollutant_row("Iowa", 2, 5.0),
        pollutant_row("Ohio", 0, 2.0),
        pollutant_row("Ohio", 1, 8.0),
    ];

    for func in [AggregateFn::Mean, AggregateFn::Median, AggregateFn::Min, AggregateFn::Max] {
        let table = query::aggregate_by_state(&rows, func);
        for entry in &table {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| r.state == entry.state)
                .map(|r| r.value)
                .collect();
            let expected = airq_service::analysis::aggregates::apply(func, &values)
                .expect("finite values aggregate");
            assert_eq!(entry.value, expected, "{:?} for {}", func, entry.state);
        }
    }
}

#[test]
fn test_all_states_filter_collapses_chart_grouping() {
    let filter = QueryFilter {
        start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
        states: Vec::new(),
        pollutant: None,
        aggregate: None,
    };
    let resolved = query::resolve(&filter);

    assert_eq!(resolved.states.len(), 50);
    assert_eq!(query::grouping_for(resolved.states.len()), ChartGrouping::Collapsed);
    assert_eq!(query::grouping_for(2), ChartGrouping::ByState);
}

#[test]
fn test_collapsed_series_averages_across_states() {
    // The collapsed all-states view: one mean value per timestamp.
    let rows = vec![
        pollutant_row("Iowa", 0, 4.0),
        pollutant_row("Ohio", 0, 8.0),
        pollutant_row("Iowa", 1, 10.0),
    ];

    let series = grouping::collapse_by_timestamp(&rows);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].1, 6.0);
    assert_eq!(series[1].1, 10.0);
}

#[test]
fn test_malformed_feed_line_fails_the_whole_state() {
    let broken = "2021 1 1 0 5.0 10.0 0\n2021 1 1\n";
    assert!(berkeley::parse_feed(broken).is_err());
}

fn pollutant_row(state: &str, hour: i32, value: f64) -> airq_service::db::PollutantRow {
    airq_service::db::PollutantRow {
        state: state.to_string(),
        timestamp: compose_timestamp(2021, 1, 1, hour).unwrap(),
        value,
    }
}
