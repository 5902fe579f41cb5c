/// Data ingestion clients.
///
/// Submodules:
/// - `berkeley` — Berkeley Earth per-state particulate matter feed.

pub mod berkeley;
