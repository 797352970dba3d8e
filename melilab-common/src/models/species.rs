//! Botanical species model

use serde::{Deserialize, Serialize};

/// A botanical pollen source identified in a sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    /// Species id
    pub id: i64,
    /// Scientific (binomial) name
    pub scientific_name: String,
    /// Common name, when recorded
    pub common_name: Option<String>,
    /// Botanical family
    pub family: Option<String>,
}
