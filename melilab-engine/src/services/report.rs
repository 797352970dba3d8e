//! Composition report assembly
//!
//! Builds the export-facing melissopalynological report for one pool:
//! percentage composition, special-mark listing, floral classification and
//! the suggested harvest date. Export rendering (PDF/Excel) happens
//! downstream; this module only shapes the data.

use super::classifier::{self, Classification};
use super::composition::{self, CompositionEntry, MarkedEntry};
use super::harvest;
use chrono::NaiveDate;
use melilab_common::models::{Drum, PollenRecord, Pool};
use serde::Serialize;
use std::collections::HashSet;

/// Pool header block of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportPoolInfo {
    /// Pool id
    pub id: i64,
    /// Registration label (registration number, id fallback)
    pub registration_number: String,
    /// Analyst display name
    pub analyst: String,
    /// Date the pool was analyzed
    pub analysis_date: Option<NaiveDate>,
    /// Pool observations
    pub observations: Option<String>,
    /// Drums composing the sample
    pub drums: Vec<Drum>,
}

/// Summary totals of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportTotals {
    /// Number of species contributing to the percentage
    pub valid_species: usize,
    /// Grain total over valid species
    pub total_grains: u64,
    /// Sum of the percentage column (≈100 when any valid grains exist)
    pub percentage_sum: f64,
}

/// Assembled composition report for one pool
#[derive(Debug, Clone, Serialize)]
pub struct CompositionReport {
    /// Pool header
    pub pool_info: ReportPoolInfo,
    /// Valid species, percentage descending
    pub entries: Vec<CompositionEntry>,
    /// Special-marked species, excluded from the percentage
    pub marked_entries: Vec<MarkedEntry>,
    /// Floral-type classification
    pub classification: Classification,
    /// Mean of the drum extraction dates, when any parse
    pub suggested_harvest_date: Option<NaiveDate>,
    /// Summary totals
    pub totals: ReportTotals,
}

/// Assemble the composition report for one pool from its records.
pub fn build(pool: &Pool, records: &[PollenRecord]) -> CompositionReport {
    let composition = composition::aggregate(records);
    let classification = classifier::classify(&composition.entries);
    let suggested_harvest_date = harvest::suggest_for_pool(pool, records);

    let totals = ReportTotals {
        valid_species: composition.entries.len(),
        total_grains: composition.entries.iter().map(|e| e.summed_count).sum(),
        percentage_sum: composition.entries.iter().map(|e| e.percentage).sum(),
    };

    CompositionReport {
        pool_info: ReportPoolInfo {
            id: pool.id,
            registration_number: pool.registration_label(),
            analyst: pool.analyst_name(),
            analysis_date: pool.analysis_date,
            observations: pool.observations.clone(),
            drums: pool.drums.clone(),
        },
        entries: composition.entries,
        marked_entries: composition.marked_entries,
        classification,
        suggested_harvest_date,
        totals,
    }
}

/// Distinct pools referenced by a record set.
///
/// First occurrence of each pool id is kept; the result is ordered by
/// analysis date descending when both pools carry one, by creation
/// timestamp descending otherwise.
pub fn distinct_pools(records: &[PollenRecord]) -> Vec<Pool> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut pools: Vec<Pool> = records
        .iter()
        .filter(|record| seen.insert(record.pool.id))
        .map(|record| record.pool.clone())
        .collect();

    pools.sort_by(|a, b| {
        if let (Some(date_a), Some(date_b)) = (a.analysis_date, b.analysis_date) {
            date_b.cmp(&date_a)
        } else {
            b.created_at.cmp(&a.created_at)
        }
    });

    pools
}
