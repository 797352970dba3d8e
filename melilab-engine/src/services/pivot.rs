//! Pool × species pivot matrix
//!
//! Reshapes per-analysis records across many pools into the matrix backing
//! the tabular review view. A missing cell means the (pool, species) pair
//! was never analyzed, which is distinct from a zero grain count.

use melilab_common::models::PollenRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One pivot row header
#[derive(Debug, Clone, Serialize)]
pub struct PivotPool {
    /// Pool display key (registration number, id fallback)
    pub key: String,
    /// Date the pool was analyzed
    pub analysis_date: Option<NaiveDate>,
}

/// One pivot column header
#[derive(Debug, Clone, Serialize)]
pub struct PivotSpecies {
    /// Species id
    pub id: i64,
    /// Scientific name
    pub scientific_name: String,
}

/// One analyzed (pool, species) cell
#[derive(Debug, Clone, Serialize)]
pub struct PivotCell {
    /// Grain count recorded for the pair
    pub count: u32,
    /// Special mark, when the record carries one
    pub mark: Option<String>,
}

/// Pool × species matrix
///
/// Row and column orders are exactly the first-seen orders of the input
/// records, so callers can render headers without re-sorting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PivotMatrix {
    /// Row headers, first-seen order
    pub pools: Vec<PivotPool>,
    /// Column headers, first-seen order, no duplicates
    pub species: Vec<PivotSpecies>,
    /// Cells keyed by pool key, then species id; absent = not analyzed.
    /// Ordered maps keep the serialized matrix identical across runs.
    pub cells: BTreeMap<String, BTreeMap<i64, PivotCell>>,
}

impl PivotMatrix {
    /// Cell lookup; `None` means the pair was never analyzed
    pub fn cell(&self, pool_key: &str, species_id: i64) -> Option<&PivotCell> {
        self.cells.get(pool_key).and_then(|row| row.get(&species_id))
    }
}

/// Build the pivot matrix from raw records across many pools.
///
/// Marked records are included (the review view shows the mark on the
/// cell). Records with an unresolved species still contribute a pool row
/// but no column. When a (pool, species) pair appears more than once the
/// last record wins.
pub fn build(records: &[PollenRecord]) -> PivotMatrix {
    let mut matrix = PivotMatrix::default();
    let mut seen_species: HashSet<i64> = HashSet::new();

    for record in records {
        let pool_key = record.pool.registration_label();

        if !matrix.cells.contains_key(&pool_key) {
            matrix.pools.push(PivotPool {
                key: pool_key.clone(),
                analysis_date: record.pool.analysis_date,
            });
            matrix.cells.insert(pool_key.clone(), BTreeMap::new());
        }

        let species = match &record.species {
            Some(species) => species,
            None => continue,
        };

        if seen_species.insert(species.id) {
            matrix.species.push(PivotSpecies {
                id: species.id,
                scientific_name: species.scientific_name.clone(),
            });
        }

        if let Some(row) = matrix.cells.get_mut(&pool_key) {
            row.insert(
                species.id,
                PivotCell {
                    count: record.grain_count,
                    mark: record.special_mark.clone().filter(|m| !m.trim().is_empty()),
                },
            );
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use melilab_common::models::{PollenRecord, Pool, Species};

    fn pool(id: i64, registration: &str) -> Pool {
        Pool {
            id,
            registration_number: Some(registration.to_string()),
            analysis_date: None,
            analyst: None,
            drums: vec![],
            observations: None,
            created_at: None,
        }
    }

    fn species(id: i64, name: &str) -> Species {
        Species {
            id,
            scientific_name: name.to_string(),
            common_name: None,
            family: None,
        }
    }

    fn record(pool: Pool, sp: Option<Species>, grain_count: u32, mark: &str) -> PollenRecord {
        PollenRecord {
            id: 0,
            pool,
            species: sp,
            grain_count,
            special_mark: if mark.is_empty() {
                None
            } else {
                Some(mark.to_string())
            },
            drum: None,
        }
    }

    #[test]
    fn test_matrix_dimensions() {
        // 3 pools, 4 distinct species across all records
        let records = vec![
            record(pool(1, "P1"), Some(species(1, "A")), 10, ""),
            record(pool(1, "P1"), Some(species(2, "B")), 5, ""),
            record(pool(2, "P2"), Some(species(3, "C")), 7, ""),
            record(pool(3, "P3"), Some(species(4, "D")), 2, ""),
            record(pool(3, "P3"), Some(species(1, "A")), 9, ""),
        ];

        let matrix = build(&records);

        assert_eq!(matrix.pools.len(), 3);
        assert_eq!(matrix.species.len(), 4);
    }

    #[test]
    fn test_absent_cell_is_not_zero() {
        let records = vec![
            record(pool(1, "P1"), Some(species(1, "A")), 0, ""),
            record(pool(2, "P2"), Some(species(2, "B")), 5, ""),
        ];

        let matrix = build(&records);

        // Analyzed with zero grains: present cell with count 0
        let zero_cell = matrix.cell("P1", 1).expect("analyzed cell");
        assert_eq!(zero_cell.count, 0);

        // Never analyzed: absent cell
        assert!(matrix.cell("P1", 2).is_none());
        assert!(matrix.cell("P2", 1).is_none());
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record(pool(2, "P2"), Some(species(9, "Z")), 1, ""),
            record(pool(1, "P1"), Some(species(3, "M")), 1, ""),
            record(pool(2, "P2"), Some(species(1, "A")), 1, ""),
        ];

        let matrix = build(&records);

        let pool_keys: Vec<&str> = matrix.pools.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(pool_keys, vec!["P2", "P1"]);

        let species_ids: Vec<i64> = matrix.species.iter().map(|s| s.id).collect();
        assert_eq!(species_ids, vec![9, 3, 1]);
    }

    #[test]
    fn test_no_duplicate_species_columns() {
        let records = vec![
            record(pool(1, "P1"), Some(species(1, "A")), 1, ""),
            record(pool(2, "P2"), Some(species(1, "A")), 2, ""),
        ];

        let matrix = build(&records);
        assert_eq!(matrix.species.len(), 1);
    }

    #[test]
    fn test_mark_carried_on_cell() {
        let records = vec![record(pool(1, "P1"), Some(species(1, "A")), 4, "##")];

        let matrix = build(&records);
        let cell = matrix.cell("P1", 1).expect("cell");
        assert_eq!(cell.count, 4);
        assert_eq!(cell.mark.as_deref(), Some("##"));
    }

    #[test]
    fn test_duplicate_pair_last_record_wins() {
        let records = vec![
            record(pool(1, "P1"), Some(species(1, "A")), 4, ""),
            record(pool(1, "P1"), Some(species(1, "A")), 9, "x"),
        ];

        let matrix = build(&records);
        let cell = matrix.cell("P1", 1).expect("cell");
        assert_eq!(cell.count, 9);
        assert_eq!(cell.mark.as_deref(), Some("x"));
    }

    #[test]
    fn test_unresolved_species_adds_pool_row_only() {
        let records = vec![record(pool(1, "P1"), None, 4, "")];

        let matrix = build(&records);
        assert_eq!(matrix.pools.len(), 1);
        assert!(matrix.species.is_empty());
    }
}
