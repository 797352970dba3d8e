//! Laboratory wire models
//!
//! JSON shapes exchanged with the record-source REST API. All of these are
//! read-only snapshots from the engine's point of view: once fetched they
//! are never mutated, every derived result is computed fresh.

pub mod pool;
pub mod record;
pub mod species;
pub mod stats;

pub use pool::{Analyst, Drum, Pool};
pub use record::PollenRecord;
pub use species::Species;
pub use stats::{CountBar, PieSlice, PoolInfo, PoolStats, ScatterPoint};
