//! Pool and drum models
//!
//! A pool is a batch of honey samples analyzed together as one analytical
//! unit; each drum is a physical container contributing to the pool, with
//! its own extraction date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Analyst display information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analyst {
    /// Given names
    pub first_names: Option<String>,
    /// Family names
    pub last_names: Option<String>,
}

impl Analyst {
    /// Full display name, `"N/A"` when both parts are missing or blank
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_names.as_deref().unwrap_or(""),
            self.last_names.as_deref().unwrap_or("")
        );
        let trimmed = name.trim();
        if trimmed.is_empty() {
            "N/A".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// A physical honey container contributing to a pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drum {
    /// Drum id
    pub id: i64,
    /// Drum code or label
    pub code: Option<String>,
    /// Extraction date as recorded upstream; free-form string, parsed by the
    /// harvest-date estimator
    pub extraction_date: Option<String>,
    /// Free-form observations
    pub observations: Option<String>,
}

/// A batch of honey samples analyzed together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    /// Pool id
    pub id: i64,
    /// Laboratory registration number (e.g. `"00042"`)
    pub registration_number: Option<String>,
    /// Date the pool was analyzed
    pub analysis_date: Option<NaiveDate>,
    /// Analyst responsible for the pool
    pub analyst: Option<Analyst>,
    /// Drums composing the sample
    #[serde(default)]
    pub drums: Vec<Drum>,
    /// Free-form observations
    pub observations: Option<String>,
    /// Record creation timestamp
    pub created_at: Option<DateTime<Utc>>,
}

impl Pool {
    /// Display key for the pool: registration number, falling back to the id
    pub fn registration_label(&self) -> String {
        self.registration_number
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Pool {}", self.id))
    }

    /// Analyst display name, `"N/A"` when no analyst is attached
    pub fn analyst_name(&self) -> String {
        self.analyst
            .as_ref()
            .map(Analyst::display_name)
            .unwrap_or_else(|| "N/A".to_string())
    }
}
