/// Grouping helpers for raw query output.
///
/// The chart collaborator renders the raw row set two ways: grouped and
/// colored by state when a few states are selected, or collapsed into one
/// series across all states when the whole country is shown. These helpers
/// supply both organizations from the same flat rows.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::db::PollutantRow;

/// Group pollutant values by state, preserving row order within each state.
///
/// The BTreeMap keeps states alphabetical, which keeps chart legends and the
/// aggregate table stable across runs.
pub fn group_by_state(rows: &[PollutantRow]) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.state.clone()).or_default().push(row.value);
    }
    groups
}

/// Collapse rows across states into one mean value per timestamp, sorted by
/// timestamp. Used for the all-states time series, where per-state lines
/// would be unreadable. Timestamps whose values are all non-finite are
/// dropped.
pub fn collapse_by_timestamp(rows: &[PollutantRow]) -> Vec<(NaiveDateTime, f64)> {
    let mut buckets: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if !row.value.is_finite() {
            continue;
        }
        let bucket = buckets.entry(row.timestamp).or_insert((0.0, 0));
        bucket.0 += row.value;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(ts, (sum, count))| (ts, sum / count as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compose_timestamp;

    fn row(state: &str, hour: i32, value: f64) -> PollutantRow {
        PollutantRow {
            state: state.to_string(),
            timestamp: compose_timestamp(2021, 1, 1, hour).unwrap(),
            value,
        }
    }

    #[test]
    fn test_group_by_state_partitions_exactly() {
        let rows = vec![row("Iowa", 0, 5.0), row("Ohio", 0, 3.0), row("Iowa", 1, 7.0)];
        let groups = group_by_state(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Iowa"], vec![5.0, 7.0]);
        assert_eq!(groups["Ohio"], vec![3.0]);
    }

    #[test]
    fn test_group_by_state_keys_are_sorted() {
        let rows = vec![row("Wyoming", 0, 1.0), row("Alabama", 0, 2.0), row("Iowa", 0, 3.0)];
        let keys: Vec<_> = group_by_state(&rows).into_keys().collect();
        assert_eq!(keys, vec!["Alabama", "Iowa", "Wyoming"]);
    }

    #[test]
    fn test_collapse_averages_states_per_timestamp() {
        let rows = vec![
            row("Iowa", 0, 4.0),
            row("Ohio", 0, 6.0),
            row("Iowa", 1, 10.0),
        ];
        let series = collapse_by_timestamp(&rows);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0], (compose_timestamp(2021, 1, 1, 0).unwrap(), 5.0));
        assert_eq!(series[1], (compose_timestamp(2021, 1, 1, 1).unwrap(), 10.0));
    }

    #[test]
    fn test_collapse_skips_non_finite_values() {
        let rows = vec![row("Iowa", 0, f64::NAN), row("Ohio", 0, 8.0), row("Utah", 1, f64::NAN)];
        let series = collapse_by_timestamp(&rows);

        // Hour 0 averages only Ohio's finite value; hour 1 has nothing finite.
        assert_eq!(series, vec![(compose_timestamp(2021, 1, 1, 0).unwrap(), 8.0)]);
    }

    #[test]
    fn test_collapse_of_empty_rows_is_empty() {
        assert!(collapse_by_timestamp(&[]).is_empty());
    }
}
