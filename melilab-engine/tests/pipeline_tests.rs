//! End-to-end pipeline tests for the analytics engine
//!
//! Drives the full record → composition → classification → report flow on a
//! realistic fixture, and the cross-pool gather against a mock statistics
//! source, without any network involved.

use chrono::NaiveDate;
use melilab_common::models::{
    Analyst, Drum, PollenRecord, Pool, PoolInfo, PoolStats, ScatterPoint, Species,
};
use melilab_engine::client::ClientError;
use melilab_engine::services::classifier::FloralType;
use melilab_engine::services::{global_scatter, pivot, pool_stats, report};
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn species(id: i64, scientific: &str, common: &str, family: &str) -> Species {
    Species {
        id,
        scientific_name: scientific.to_string(),
        common_name: Some(common.to_string()),
        family: Some(family.to_string()),
    }
}

fn pool(id: i64, registration: &str, analysis_date: Option<NaiveDate>) -> Pool {
    Pool {
        id,
        registration_number: Some(registration.to_string()),
        analysis_date,
        analyst: Some(Analyst {
            first_names: Some("Ana".to_string()),
            last_names: Some("Ruiz".to_string()),
        }),
        drums: vec![
            Drum {
                id: 1,
                code: Some("T-1".to_string()),
                extraction_date: Some("2024-04-28".to_string()),
                observations: None,
            },
            Drum {
                id: 2,
                code: Some("T-2".to_string()),
                extraction_date: Some("30/04/2024".to_string()),
                observations: None,
            },
        ],
        observations: None,
        created_at: None,
    }
}

fn record(pool: &Pool, sp: &Species, grain_count: u32, mark: Option<&str>) -> PollenRecord {
    PollenRecord {
        id: 0,
        pool: pool.clone(),
        species: Some(sp.clone()),
        grain_count,
        special_mark: mark.map(String::from),
        drum: None,
    }
}

/// Fixture: one pool, a dominant eucalyptus count, two minor species and a
/// contaminant marked for exclusion.
fn monofloral_fixture() -> (Pool, Vec<PollenRecord>) {
    let p = pool(1, "00001", Some(date(2024, 5, 10)));
    let eucalyptus = species(1, "Eucalyptus globulus", "blue gum", "Myrtaceae");
    let clover = species(2, "Trifolium repens", "white clover", "Fabaceae");
    let willow = species(3, "Salix babylonica", "weeping willow", "Salicaceae");
    let ragweed = species(4, "Ambrosia artemisiifolia", "ragweed", "Asteraceae");

    let records = vec![
        record(&p, &eucalyptus, 230, None),
        record(&p, &clover, 120, None),
        record(&p, &willow, 50, None),
        record(&p, &ragweed, 40, Some("x")),
    ];

    (p, records)
}

#[test]
fn report_pipeline_classifies_and_sums() {
    let (p, records) = monofloral_fixture();

    let result = report::build(&p, &records);

    // 230 / 400 valid grains = 57.5% dominant share
    assert_eq!(result.entries.len(), 3);
    assert_eq!(result.entries[0].scientific_name, "Eucalyptus globulus");
    assert!((result.entries[0].percentage - 57.5).abs() < 1e-9);
    assert!((result.totals.percentage_sum - 100.0).abs() < 0.001);

    assert_eq!(result.classification.floral_type, FloralType::Monofloral);
    assert_eq!(
        result.classification.dominant_species.as_deref(),
        Some("Eucalyptus globulus")
    );

    // The marked contaminant stays out of the percentage but is reported
    assert_eq!(result.marked_entries.len(), 1);
    assert_eq!(
        result.marked_entries[0].scientific_name,
        "Ambrosia artemisiifolia"
    );

    // Mean of 2024-04-28 and 30/04/2024 (both parse)
    assert_eq!(result.suggested_harvest_date, Some(date(2024, 4, 29)));
}

#[test]
fn report_pipeline_is_idempotent() {
    let (p, records) = monofloral_fixture();

    let first = serde_json::to_string(&report::build(&p, &records)).unwrap();
    let second = serde_json::to_string(&report::build(&p, &records)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn pivot_spans_pools_and_species() {
    let p1 = pool(1, "00001", Some(date(2024, 5, 10)));
    let p2 = pool(2, "00002", Some(date(2024, 6, 2)));
    let p3 = pool(3, "00003", None);
    let a = species(1, "Eucalyptus globulus", "blue gum", "Myrtaceae");
    let b = species(2, "Trifolium repens", "white clover", "Fabaceae");
    let c = species(3, "Salix babylonica", "weeping willow", "Salicaceae");
    let d = species(4, "Ambrosia artemisiifolia", "ragweed", "Asteraceae");

    let records = vec![
        record(&p1, &a, 10, None),
        record(&p1, &b, 4, None),
        record(&p2, &c, 7, None),
        record(&p3, &d, 1, Some("#")),
        record(&p3, &a, 3, None),
    ];

    let matrix = pivot::build(&records);

    assert_eq!(matrix.pools.len(), 3);
    assert_eq!(matrix.species.len(), 4);
    assert!(matrix.cell("00001", 1).is_some());
    assert!(matrix.cell("00002", 1).is_none());
    assert_eq!(
        matrix.cell("00003", 4).and_then(|cell| cell.mark.as_deref()),
        Some("#")
    );
}

/// Mock statistics source backed by locally built per-pool stats
struct FixtureSource {
    responses: HashMap<i64, PoolStats>,
    failing: Vec<i64>,
}

#[async_trait::async_trait]
impl global_scatter::StatsSource for FixtureSource {
    async fn fetch_pool_stats(&self, pool_id: i64) -> Result<PoolStats, ClientError> {
        if self.failing.contains(&pool_id) {
            return Err(ClientError::Api(500, "mock backend down".to_string()));
        }
        self.responses
            .get(&pool_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("pool {}", pool_id)))
    }
}

#[tokio::test]
async fn global_scatter_over_built_pool_stats() {
    let p1 = pool(1, "00001", Some(date(2024, 5, 10)));
    let p2 = pool(2, "00002", Some(date(2024, 5, 20)));
    let eucalyptus = species(1, "Eucalyptus globulus", "blue gum", "Myrtaceae");
    let clover = species(2, "Trifolium repens", "white clover", "Fabaceae");

    let stats1 = pool_stats::build(&p1, &[record(&p1, &eucalyptus, 30, None)]);
    let stats2 = pool_stats::build(
        &p2,
        &[
            record(&p2, &eucalyptus, 12, None),
            record(&p2, &clover, 5, None),
        ],
    );

    let source = FixtureSource {
        responses: HashMap::from([(1, stats1), (2, stats2)]),
        failing: vec![],
    };

    let aggregate = global_scatter::aggregate(&source, &[p1.clone(), p2.clone()]).await;

    // Both pools were analyzed in May: eucalyptus counts merge on (species, 5)
    assert_eq!(
        aggregate.species_axis,
        vec!["Eucalyptus globulus", "Trifolium repens"]
    );
    let merged = aggregate
        .points
        .iter()
        .find(|pt| pt.species == "Eucalyptus globulus")
        .unwrap();
    assert_eq!(merged.month_index, 5);
    assert_eq!(merged.count, 42);
}

#[tokio::test]
async fn global_scatter_survives_failing_pool() {
    let p1 = pool(1, "00001", Some(date(2024, 5, 10)));
    let p2 = pool(2, "00002", Some(date(2024, 6, 20)));

    let make_stats = |pool_id: i64, species: &str, month_index: u32, count: u64| PoolStats {
        pool_info: PoolInfo {
            id: pool_id,
            registration_number: None,
            analyst: "N/A".to_string(),
            analysis_date: None,
            total_grains: count,
            species_count: 1,
        },
        pie_chart: vec![],
        bar_chart: vec![],
        scatter_plot: vec![ScatterPoint {
            species: species.to_string(),
            month_index,
            month_label: "May".to_string(),
            count,
            radius: 0.0,
        }],
    };

    let source = FixtureSource {
        responses: HashMap::from([
            (1, make_stats(1, "Eucalyptus globulus", 5, 30)),
            (2, make_stats(2, "Trifolium repens", 6, 9)),
        ]),
        failing: vec![2],
    };

    let aggregate = global_scatter::aggregate(&source, &[p1, p2]).await;

    assert_eq!(aggregate.points.len(), 1);
    assert_eq!(aggregate.points[0].species, "Eucalyptus globulus");
    assert_eq!(aggregate.species_axis, vec!["Eucalyptus globulus"]);
}
