/// Aggregate functions for pollutant concentrations.
///
/// All functions operate on finite values only: NaN sentinels from the feed
/// (and NULLs surfaced as NaN by the store layer) are excluded before
/// aggregation. An input with no finite values aggregates to `None`, and the
/// state is omitted from the map table rather than plotted as zero.

use crate::model::AggregateFn;

/// Apply `func` to the finite values of `values`.
pub fn apply(func: AggregateFn, values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    match func {
        AggregateFn::Mean => mean(&finite),
        AggregateFn::Median => median(&finite),
        AggregateFn::Min => min(&finite),
        AggregateFn::Max => max(&finite),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with the usual even-count convention: the mean of the two middle
/// values, matching the dashboard's original aggregation.
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    // Finite values are totally ordered, so the comparison never falls
    // through to Equal.
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
