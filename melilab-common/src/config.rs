//! Configuration resolution for the melilab workspace
//!
//! Provides two-tier configuration resolution with ENV → TOML priority and
//! built-in defaults. The engine only needs to know where the laboratory
//! record-source API lives and how long to wait for it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default record-source API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the record-source base URL
pub const ENV_API_URL: &str = "MELILAB_API_URL";

/// Environment variable overriding the request timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "MELILAB_TIMEOUT_SECS";

/// TOML configuration file contents (`~/.config/melilab/melilab.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Record-source API base URL
    pub api_base_url: Option<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Record-source API base URL
    pub api_base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Locate the TOML config file under the user config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("melilab").join("melilab.toml"))
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Resolve the engine configuration from 2-tier configuration
///
/// **Priority:** ENV → TOML → built-in default
pub fn resolve(toml_config: Option<&TomlConfig>) -> EngineConfig {
    let env_url = std::env::var(ENV_API_URL).ok().filter(|v| is_valid_value(v));
    let toml_url = toml_config
        .and_then(|c| c.api_base_url.clone())
        .filter(|v| is_valid_value(v));

    // Warn if multiple sources (potential misconfiguration)
    if env_url.is_some() && toml_url.is_some() {
        warn!(
            "Record-source URL found in both environment and TOML. Using environment (highest priority)."
        );
    }

    let api_base_url = match (env_url, toml_url) {
        (Some(url), _) => {
            info!("Record-source URL loaded from environment variable");
            url
        }
        (None, Some(url)) => {
            info!("Record-source URL loaded from TOML config");
            url
        }
        (None, None) => DEFAULT_API_BASE_URL.to_string(),
    };

    let timeout_secs = std::env::var(ENV_TIMEOUT_SECS)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| toml_config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    EngineConfig {
        api_base_url,
        timeout_secs,
    }
}

/// Validate a config value (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}
