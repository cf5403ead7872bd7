//! Configuration loading and config file discovery
//!
//! Resolution order for each value (highest first):
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! This module owns tiers 3 and 4. Tiers 1 and 2 are applied by the binary
//! crate, which knows its own argument names.

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FACETAG_CONFIG";

/// Config file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "facetag.toml";

/// Logging section of the TOML config
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default tracing filter directive (e.g. "info", "facetag_id=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path; stderr when absent
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    CompiledDefaults::LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

/// Contents of `facetag.toml`
///
/// Every field is optional so that a partial file still parses; missing
/// values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Face API base endpoint, e.g. `https://westus.api.cognitive.microsoft.com/face/v1.0/`
    #[serde(default)]
    pub base_url: Option<String>,
    /// Value sent in the `Ocp-Apim-Subscription-Key` header
    #[serde(default)]
    pub subscription_key: Option<String>,
    /// Person group used to scope identification
    #[serde(default)]
    pub person_group_id: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Minimum spacing between person lookups in seconds
    #[serde(default)]
    pub lookup_interval_secs: Option<u64>,
    /// Minimum candidate confidence accepted for person lookup
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiled defaults (tier 4)
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const BASE_URL: &'static str = "https://westus.api.cognitive.microsoft.com/face/v1.0/";
    pub const PERSON_GROUP_ID: &'static str = "testgroup";
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const LOOKUP_INTERVAL_SECS: u64 = 3;
    pub const MAX_CANDIDATES: u32 = 1;
    pub const CONFIDENCE_THRESHOLD: f64 = 0.5;
    pub const LOG_LEVEL: &'static str = "info";
}

/// Locate the config file
///
/// `FACETAG_CONFIG` wins when set; otherwise `<config_dir>/facetag/facetag.toml`.
/// Returns `None` when no candidate path can be determined.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("facetag").join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Load the TOML config, degrading to defaults
///
/// A missing file is normal and only logged at debug. An unreadable or
/// malformed file is logged as a warning; startup continues with defaults.
pub fn load_or_default(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        debug!("No config file location available, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config file");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), "Ignoring unusable config file: {}", e);
            TomlConfig::default()
        }
    }
}
