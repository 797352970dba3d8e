//! Per-pool statistics payload
//!
//! Shape of the `pool/{id}/stats` response consumed by the global temporal
//! aggregator, and produced locally by the per-pool stats builder. Chart
//! rendering itself happens downstream; these are data series only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pool summary attached to a statistics payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Pool id
    pub id: i64,
    /// Laboratory registration number
    pub registration_number: Option<String>,
    /// Analyst display name
    pub analyst: String,
    /// Date the pool was analyzed
    pub analysis_date: Option<NaiveDate>,
    /// Grain total across every record of the pool
    pub total_grains: u64,
    /// Number of distinct species counted
    pub species_count: usize,
}

/// One species' slice of the per-pool pie chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieSlice {
    /// Scientific name
    pub species: String,
    /// Common name, empty when not recorded
    pub common_name: String,
    /// Grain count for the species
    pub count: u64,
    /// Share of the pool total, rounded to 2 decimals
    pub percentage: f64,
}

/// One species' bar in the per-pool grain-count series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountBar {
    /// Scientific name
    pub species: String,
    /// Grain count for the species
    pub count: u64,
}

/// One point of a per-pool scatter dataset: a species' grain total placed at
/// the month the pool was analyzed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Scientific name
    pub species: String,
    /// Month 1-12; sentinel 0 = unspecified month
    pub month_index: u32,
    /// Display label for the month
    pub month_label: String,
    /// Grain total for the species in this pool
    pub count: u64,
    /// Visual radius hint for rendering
    pub radius: f64,
}

/// Aggregate statistics for one pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    /// Pool summary
    pub pool_info: PoolInfo,
    /// Percentage composition series
    pub pie_chart: Vec<PieSlice>,
    /// Grain-count series
    pub bar_chart: Vec<CountBar>,
    /// Species × month points
    pub scatter_plot: Vec<ScatterPoint>,
}
