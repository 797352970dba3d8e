//! Pollen-count record model

use super::{Drum, Pool, Species};
use serde::{Deserialize, Serialize};

/// One per-species grain count inside a pool's palynological analysis
///
/// Records whose `special_mark` is non-empty flag contaminant pollen: the
/// grains were counted but must not contribute to the honey-composition
/// percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollenRecord {
    /// Record id
    pub id: i64,
    /// Pool this count belongs to
    pub pool: Pool,
    /// Counted species; `None` when the reference did not resolve
    pub species: Option<Species>,
    /// Number of pollen grains counted
    pub grain_count: u32,
    /// Exclusion mark (`"x"`, `"#"`, `"##"`), absent or empty for valid counts
    pub special_mark: Option<String>,
    /// Drum the underlying sample was drawn from, when the upstream
    /// serializer attaches it
    #[serde(default)]
    pub drum: Option<Drum>,
}

impl PollenRecord {
    /// Whether this record carries a non-empty special mark
    pub fn is_marked(&self) -> bool {
        self.special_mark
            .as_deref()
            .map(|m| !m.trim().is_empty())
            .unwrap_or(false)
    }
}
