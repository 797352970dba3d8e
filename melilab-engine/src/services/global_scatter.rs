//! Cross-pool temporal aggregation
//!
//! Fans out per-pool statistics fetches across every pool, then merges the
//! per-pool scatter datasets into a single species × month frequency
//! dataset with a bounded visual radius for the global scatter plot.
//!
//! Per-pool error isolation: a pool whose statistics fetch fails or returns
//! a malformed payload contributes nothing and never aborts the overall
//! aggregation. Accumulation is a commutative sum keyed by
//! (species, month), so fetch completion order cannot change the result.

use crate::client::ClientError;
use futures::future::join_all;
use melilab_common::models::{Pool, PoolStats};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Radius used when every aggregated count is equal
const FLAT_RADIUS: f64 = 6.0;
/// Lower bound of the scaled radius range
const MIN_RADIUS: f64 = 4.0;
/// Width of the scaled radius range (upper bound = MIN_RADIUS + RADIUS_SPAN)
const RADIUS_SPAN: f64 = 10.0;

/// Per-pool statistics source, fetched independently per pool
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch aggregate statistics for one pool
    async fn fetch_pool_stats(&self, pool_id: i64) -> Result<PoolStats, ClientError>;
}

/// One aggregated species × month point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalScatterPoint {
    /// Scientific name
    pub species: String,
    /// Month 1-12; sentinel 0 = unspecified month
    pub month_index: u32,
    /// Display label, first one seen for this (species, month)
    pub month_label: String,
    /// Grain count summed across pools
    pub count: u64,
    /// Visual radius in [4, 14], or 6 when all counts are equal
    pub radius: f64,
}

/// Global species × month aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalScatter {
    /// Distinct species across all points, lexicographic
    pub species_axis: Vec<String>,
    /// Aggregated points, ordered by (species, month)
    pub points: Vec<GlobalScatterPoint>,
}

/// Aggregate scatter statistics across every pool.
///
/// Fetches run concurrently; pools whose fetch fails are excluded from the
/// merge and logged, never propagated. All pools failing simply yields the
/// explicit empty aggregate.
pub async fn aggregate(source: &dyn StatsSource, pools: &[Pool]) -> GlobalScatter {
    let fetches = pools.iter().map(|pool| {
        let pool_id = pool.id;
        async move {
            match source.fetch_pool_stats(pool_id).await {
                Ok(stats) => {
                    debug!(
                        pool_id,
                        points = stats.scatter_plot.len(),
                        "Pool statistics fetched"
                    );
                    Some(stats)
                }
                Err(e) => {
                    warn!(
                        pool_id,
                        error = %e,
                        "Pool statistics fetch failed, excluded from aggregate"
                    );
                    None
                }
            }
        }
    });

    let stats: Vec<PoolStats> = join_all(fetches).await.into_iter().flatten().collect();

    merge(&stats)
}

/// Merge per-pool scatter datasets into the global aggregate.
///
/// Synchronous fan-in half of [`aggregate`], separated so the merge rules
/// stay testable without a statistics source.
pub fn merge(stats: &[PoolStats]) -> GlobalScatter {
    struct Accum {
        count: u64,
        month_label: String,
    }

    let mut accumulated: HashMap<(String, u32), Accum> = HashMap::new();

    for pool_stats in stats {
        for point in &pool_stats.scatter_plot {
            let key = (point.species.clone(), point.month_index);
            let entry = accumulated.entry(key).or_insert_with(|| Accum {
                count: 0,
                month_label: point.month_label.clone(),
            });
            entry.count += point.count;
        }
    }

    if accumulated.is_empty() {
        return GlobalScatter::default();
    }

    let species_axis: Vec<String> = accumulated
        .keys()
        .map(|(species, _)| species.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Clamp both ends at 1 so a single giant count still spreads the scale
    let min_count = accumulated
        .values()
        .map(|a| a.count)
        .min()
        .unwrap_or(1)
        .min(1);
    let max_count = accumulated
        .values()
        .map(|a| a.count)
        .max()
        .unwrap_or(1)
        .max(1);

    let scale_radius = |count: u64| -> f64 {
        if min_count == max_count {
            FLAT_RADIUS
        } else {
            let t = (count - min_count) as f64 / (max_count - min_count) as f64;
            MIN_RADIUS + t * RADIUS_SPAN
        }
    };

    let mut points: Vec<GlobalScatterPoint> = accumulated
        .into_iter()
        .map(|((species, month_index), accum)| GlobalScatterPoint {
            species,
            month_index,
            month_label: accum.month_label,
            count: accum.count,
            radius: scale_radius(accum.count),
        })
        .collect();

    // Deterministic output order regardless of fetch completion
    points.sort_by(|a, b| {
        a.species
            .cmp(&b.species)
            .then_with(|| a.month_index.cmp(&b.month_index))
    });

    GlobalScatter {
        species_axis,
        points,
    }
}
