/// Dashboard query service.
///
/// Resolves a dashboard filter (with its silent defaults), fetches the
/// matching rows once, and produces the two views the UI collaborator
/// renders from: the raw row set for the time-series and histogram tabs,
/// and the aggregated-by-state table for the choropleth map. The resolved
/// filter is echoed back for client-side state.

use chrono::NaiveDate;
use postgres::Client;
use serde::{Deserialize, Serialize};

use crate::analysis::{aggregates, grouping};
use crate::db::{self, PollutantRow};
use crate::model::{AggregateFn, AirQualityError, Pollutant};
use crate::states;

/// State-set size at or above which the charts collapse into a single
/// cross-state series instead of per-state grouping.
pub const COLLAPSE_THRESHOLD: usize = 50;

// ---------------------------------------------------------------------------
// Filter types
// ---------------------------------------------------------------------------

/// Raw dashboard inputs, as posted by the UI collaborator. Pollutant and
/// aggregate arrive as free-form strings so that missing or unrecognized
/// values can default silently rather than reject the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Empty means all monitored states.
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub pollutant: Option<String>,
    #[serde(default)]
    pub aggregate: Option<String>,
}

/// A filter with every default applied: the concrete inputs the store
/// query and the aggregation actually use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub states: Vec<String>,
    pub pollutant: Pollutant,
    pub aggregate: AggregateFn,
}

/// Apply the dashboard's defaulting rules: empty state list becomes all 50
/// states, missing pollutant becomes PM2.5, missing or unrecognized
/// aggregate becomes the median.
pub fn resolve(filter: &QueryFilter) -> ResolvedFilter {
    let states = if filter.states.is_empty() {
        states::state_names()
    } else {
        filter.states.clone()
    };

    ResolvedFilter {
        start_date: filter.start_date,
        end_date: filter.end_date,
        states,
        pollutant: Pollutant::from_name(filter.pollutant.as_deref()),
        aggregate: AggregateFn::from_name(filter.aggregate.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// How the chart collaborator should group the raw rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartGrouping {
    /// Color lines and histogram bars by state.
    ByState,
    /// Collapse across states into one series (all-states view).
    Collapsed,
}

/// One row of the choropleth map table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAggregate {
    pub state: String,
    pub value: f64,
}

/// Everything one dashboard interaction needs: the echoed filter, the raw
/// rows, the map table, and the grouping key.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub filter: ResolvedFilter,
    pub rows: Vec<PollutantRow>,
    pub by_state: Vec<StateAggregate>,
    pub grouping: ChartGrouping,
}

// ---------------------------------------------------------------------------
// Query execution
// ---------------------------------------------------------------------------

/// Run one dashboard query.
///
/// An empty result set is valid and yields empty views, never an error;
/// the dashboard renders empty charts.
pub fn run_query(client: &mut Client, filter: &QueryFilter) -> Result<DashboardData, AirQualityError> {
    let resolved = resolve(filter);

    let rows = db::fetch_rows(
        client,
        resolved.start_date,
        resolved.end_date,
        &resolved.states,
        resolved.pollutant,
    )?;

    let by_state = aggregate_by_state(&rows, resolved.aggregate);
    let grouping = grouping_for(resolved.states.len());

    Ok(DashboardData {
        filter: resolved,
        rows,
        by_state,
        grouping,
    })
}

/// Aggregate the pollutant values of `rows` per state. States whose values
/// are all missing are omitted rather than reported as zero.
pub fn aggregate_by_state(rows: &[PollutantRow], func: AggregateFn) -> Vec<StateAggregate> {
    grouping::group_by_state(rows)
        .into_iter()
        .filter_map(|(state, values)| {
            aggregates::apply(func, &values).map(|value| StateAggregate { state, value })
        })
        .collect()
}

/// Grouping key for a state set of the given size.
pub fn grouping_for(state_count: usize) -> ChartGrouping {
    if state_count >= COLLAPSE_THRESHOLD {
        ChartGrouping::Collapsed
    } else {
        ChartGrouping::ByState
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
