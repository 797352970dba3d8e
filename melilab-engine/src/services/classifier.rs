//! Floral-type classification
//!
//! A honey is monofloral when a single species' pollen share strictly
//! exceeds the dominance threshold; otherwise it is multifloral, still
//! reported together with its most prevalent species. Classification is a
//! pure function of the sorted composition; the analyst may override it
//! downstream.

use super::composition::CompositionEntry;
use serde::Serialize;

/// Dominance threshold (percent). Strictly greater classifies as monofloral;
/// exactly this value is multifloral.
pub const MONOFLORAL_THRESHOLD: f64 = 45.0;

/// Floral type of a honey pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FloralType {
    /// One species dominates above the threshold
    Monofloral,
    /// No species dominates
    Multifloral,
    /// No valid composition data
    Undetermined,
}

impl FloralType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FloralType::Monofloral => "MONOFLORAL",
            FloralType::Multifloral => "MULTIFLORAL",
            FloralType::Undetermined => "UNDETERMINED",
        }
    }
}

/// Classification of one pool's composition
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Floral type
    pub floral_type: FloralType,
    /// Most prevalent species, reported for both floral types
    pub dominant_species: Option<String>,
    /// The dominant species' share of the valid grain total
    pub dominant_percentage: Option<f64>,
    /// Human-readable summary for report rendering
    pub description: String,
}

/// Classify a composition sorted by percentage descending.
///
/// Empty input is `UNDETERMINED`; it performs no I/O and no mutation.
pub fn classify(entries: &[CompositionEntry]) -> Classification {
    let dominant = match entries.first() {
        Some(entry) => entry,
        None => {
            return Classification {
                floral_type: FloralType::Undetermined,
                dominant_species: None,
                dominant_percentage: None,
                description: "Insufficient data".to_string(),
            }
        }
    };

    if dominant.percentage > MONOFLORAL_THRESHOLD {
        Classification {
            floral_type: FloralType::Monofloral,
            dominant_species: Some(dominant.scientific_name.clone()),
            dominant_percentage: Some(dominant.percentage),
            description: format!(
                "Monofloral honey of {} ({:.1}%)",
                dominant.scientific_name, dominant.percentage
            ),
        }
    } else {
        Classification {
            floral_type: FloralType::Multifloral,
            dominant_species: Some(dominant.scientific_name.clone()),
            dominant_percentage: Some(dominant.percentage),
            description: format!(
                "Multifloral honey - dominant species: {} ({:.1}%)",
                dominant.scientific_name, dominant.percentage
            ),
        }
    }
}
