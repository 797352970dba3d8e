//! Analytics services
//!
//! Pure data transformations over laboratory record snapshots, plus the
//! cross-pool statistics gather. Nothing here holds state between calls:
//! re-running a service on the same records yields identical output.

pub mod classifier;
pub mod composition;
pub mod global_scatter;
pub mod harvest;
pub mod pivot;
pub mod pool_stats;
pub mod report;
