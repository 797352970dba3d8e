//! Pollen composition aggregation
//!
//! Turns one pool's raw per-grain species counts into percentage
//! composition. Species flagged with a special mark (contaminant pollen)
//! are listed separately and never contribute to the honey percentage.

use melilab_common::models::PollenRecord;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Placeholder used when a species reference or name cannot be resolved
pub const UNRESOLVED_LABEL: &str = "N/A";

/// One species' share of a pool's valid grain total
#[derive(Debug, Clone, Serialize)]
pub struct CompositionEntry {
    /// Species id; 0 when the species reference did not resolve
    pub species_id: i64,
    /// Scientific name
    pub scientific_name: String,
    /// Common name
    pub common_name: String,
    /// Botanical family
    pub family: String,
    /// Grain count summed over the pool's records for this species
    pub summed_count: u64,
    /// Share of the valid grain total, 0-100
    pub percentage: f64,
}

/// A species excluded from the percentage by a special mark
#[derive(Debug, Clone, Serialize)]
pub struct MarkedEntry {
    /// Species id; 0 when the species reference did not resolve
    pub species_id: i64,
    /// Scientific name
    pub scientific_name: String,
    /// Common name
    pub common_name: String,
    /// Botanical family
    pub family: String,
    /// Grain count summed over the pool's marked records for this species
    pub summed_count: u64,
    /// Distinct mark codes observed, sorted
    pub marks: Vec<String>,
}

/// Result of aggregating one pool's records
#[derive(Debug, Clone, Default, Serialize)]
pub struct Composition {
    /// Valid species ordered by percentage descending, ties broken
    /// lexicographically by scientific name
    pub entries: Vec<CompositionEntry>,
    /// Special-marked species, no percentage
    pub marked_entries: Vec<MarkedEntry>,
}

/// Resolved display fields for a record's species reference
fn species_fields(record: &PollenRecord) -> (i64, String, String, String) {
    match &record.species {
        Some(species) => (
            species.id,
            non_blank(Some(&species.scientific_name)),
            non_blank(species.common_name.as_deref()),
            non_blank(species.family.as_deref()),
        ),
        None => (
            0,
            UNRESOLVED_LABEL.to_string(),
            UNRESOLVED_LABEL.to_string(),
            UNRESOLVED_LABEL.to_string(),
        ),
    }
}

fn non_blank(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => UNRESOLVED_LABEL.to_string(),
    }
}

/// Aggregate one pool's records into percentage composition.
///
/// Records partition into *valid* (no special mark, grain count > 0) and
/// *marked* (non-empty special mark, grain count > 0); zero-count records
/// contribute to neither. Percentages are computed over the valid grain
/// total only. Empty input yields empty lists, never an error.
pub fn aggregate(records: &[PollenRecord]) -> Composition {
    let mut valid: HashMap<i64, CompositionEntry> = HashMap::new();
    let mut marked: HashMap<i64, (MarkedEntry, BTreeSet<String>)> = HashMap::new();
    let mut total: u64 = 0;

    for record in records {
        if record.grain_count == 0 {
            continue;
        }

        let (species_id, scientific_name, common_name, family) = species_fields(record);
        let count = u64::from(record.grain_count);

        if record.is_marked() {
            let (entry, marks) = marked.entry(species_id).or_insert_with(|| {
                (
                    MarkedEntry {
                        species_id,
                        scientific_name: scientific_name.clone(),
                        common_name: common_name.clone(),
                        family: family.clone(),
                        summed_count: 0,
                        marks: Vec::new(),
                    },
                    BTreeSet::new(),
                )
            });
            entry.summed_count += count;
            if let Some(mark) = record.special_mark.as_deref() {
                marks.insert(mark.to_string());
            }
        } else {
            let entry = valid.entry(species_id).or_insert_with(|| CompositionEntry {
                species_id,
                scientific_name: scientific_name.clone(),
                common_name: common_name.clone(),
                family: family.clone(),
                summed_count: 0,
                percentage: 0.0,
            });
            entry.summed_count += count;
            total += count;
        }
    }

    let mut entries: Vec<CompositionEntry> = valid
        .into_values()
        .map(|mut entry| {
            entry.percentage = if total > 0 {
                entry.summed_count as f64 * 100.0 / total as f64
            } else {
                0.0
            };
            entry
        })
        .collect();

    // Percentage descending; lexicographic scientific name breaks ties so
    // the ordering never depends on input iteration order
    entries.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.scientific_name.cmp(&b.scientific_name))
    });

    let mut marked_entries: Vec<MarkedEntry> = marked
        .into_values()
        .map(|(mut entry, marks)| {
            entry.marks = marks.into_iter().collect();
            entry
        })
        .collect();

    marked_entries.sort_by(|a, b| {
        a.scientific_name
            .cmp(&b.scientific_name)
            .then_with(|| a.species_id.cmp(&b.species_id))
    });

    Composition {
        entries,
        marked_entries,
    }
}
