//! Per-pool chart statistics
//!
//! Builds the pie/bar/scatter data series and pool summary behind the
//! per-pool charts, from that pool's raw records. Every record participates
//! here, marked or not; the composition report is where special marks are
//! filtered out.

use melilab_common::models::{CountBar, PieSlice, PollenRecord, Pool, PoolInfo, PoolStats, ScatterPoint};
use std::collections::BTreeMap;

/// Month display labels; index 0 is the unspecified-month sentinel
pub const MONTH_LABELS: [&str; 13] = [
    "Unspecified",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Scatter radius cap for per-pool datasets
const MAX_POOL_RADIUS: f64 = 20.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build aggregate statistics for one pool from its records.
///
/// Species are visited in lexicographic scientific-name order. The scatter
/// dataset places every species total at the pool's analysis month, with
/// sentinel month 0 when the pool carries no analysis date. Empty input
/// yields empty data series, never an error.
pub fn build(pool: &Pool, records: &[PollenRecord]) -> PoolStats {
    // Lexicographic species order, summing duplicate records per species
    let mut by_species: BTreeMap<String, (String, u64)> = BTreeMap::new();
    let mut total_grains: u64 = 0;

    for record in records {
        let (scientific_name, common_name) = match &record.species {
            Some(species) => (
                species.scientific_name.clone(),
                species.common_name.clone().unwrap_or_default(),
            ),
            None => ("N/A".to_string(), String::new()),
        };

        let count = u64::from(record.grain_count);
        let entry = by_species
            .entry(scientific_name)
            .or_insert((common_name, 0));
        entry.1 += count;
        total_grains += count;
    }

    let pie_chart: Vec<PieSlice> = by_species
        .iter()
        .map(|(species, (common_name, count))| PieSlice {
            species: species.clone(),
            common_name: common_name.clone(),
            count: *count,
            percentage: if total_grains > 0 {
                round2(*count as f64 / total_grains as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    let bar_chart: Vec<CountBar> = pie_chart
        .iter()
        .map(|slice| CountBar {
            species: slice.species.clone(),
            count: slice.count,
        })
        .collect();

    let (month_index, month_label) = match pool.analysis_date {
        Some(date) => {
            let month = chrono::Datelike::month(&date);
            (month, MONTH_LABELS[month as usize].to_string())
        }
        None => (0, MONTH_LABELS[0].to_string()),
    };

    let scatter_plot: Vec<ScatterPoint> = by_species
        .iter()
        .map(|(species, (_, count))| ScatterPoint {
            species: species.clone(),
            month_index,
            month_label: month_label.clone(),
            count: *count,
            radius: (*count as f64 / 10.0).min(MAX_POOL_RADIUS),
        })
        .collect();

    PoolStats {
        pool_info: PoolInfo {
            id: pool.id,
            registration_number: pool.registration_number.clone(),
            analyst: pool.analyst_name(),
            analysis_date: pool.analysis_date,
            total_grains,
            species_count: by_species.len(),
        },
        pie_chart,
        bar_chart,
        scatter_plot,
    }
}
