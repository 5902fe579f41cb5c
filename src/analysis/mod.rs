/// Data organization utilities for the air quality service.
///
/// This module provides the aggregate math behind the choropleth map table
/// and the grouping helpers the chart collaborator applies to raw rows.
/// Rendering itself happens outside this crate.
///
/// Submodules:
/// - `aggregates` — mean/median/min/max over finite pollutant values.
/// - `grouping` — organizes flat query output by state or by timestamp.

pub mod aggregates;
pub mod grouping;
