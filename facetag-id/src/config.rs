//! Configuration resolution for facetag-id
//!
//! Each value is resolved CLI → environment → TOML → compiled default. The
//! subscription key has no compiled default; a missing key is a
//! configuration error.

use crate::face_api::FaceApiConfig;
use facetag_common::config::{CompiledDefaults, LoggingConfig, TomlConfig};
use facetag_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

pub const BASE_URL_ENV: &str = "FACETAG_BASE_URL";
pub const SUBSCRIPTION_KEY_ENV: &str = "FACETAG_SUBSCRIPTION_KEY";
pub const PERSON_GROUP_ID_ENV: &str = "FACETAG_PERSON_GROUP_ID";

/// Values given on the command line (tier 1)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub subscription_key: Option<String>,
    pub person_group_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub lookup_interval_secs: Option<u64>,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub face_api: FaceApiConfig,
    pub lookup_interval: Duration,
    pub logging: LoggingConfig,
}

/// Resolve configuration using the process environment
pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<ResolvedConfig> {
    resolve_with_env(cli, toml_config, |name| std::env::var(name).ok())
}

/// Resolve configuration with an explicit environment lookup
pub fn resolve_with_env<E>(
    cli: &CliOverrides,
    toml_config: &TomlConfig,
    env: E,
) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let subscription_key = resolve_subscription_key(
        cli.subscription_key.as_deref(),
        env(SUBSCRIPTION_KEY_ENV),
        toml_config.subscription_key.as_deref(),
    )?;

    let base_url = first_valid(&[
        cli.base_url.clone(),
        env(BASE_URL_ENV),
        toml_config.base_url.clone(),
    ])
    .unwrap_or_else(|| CompiledDefaults::BASE_URL.to_string());

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::InvalidInput(format!(
            "Face API base URL must start with http:// or https://, got '{}'",
            base_url
        )));
    }

    let person_group_id = first_valid(&[
        cli.person_group_id.clone(),
        env(PERSON_GROUP_ID_ENV),
        toml_config.person_group_id.clone(),
    ])
    .unwrap_or_else(|| CompiledDefaults::PERSON_GROUP_ID.to_string());

    let request_timeout = resolve_request_timeout(cli.request_timeout_secs, toml_config)?;

    let lookup_interval_secs = cli
        .lookup_interval_secs
        .or(toml_config.lookup_interval_secs)
        .unwrap_or(CompiledDefaults::LOOKUP_INTERVAL_SECS);

    let confidence_threshold = toml_config
        .confidence_threshold
        .unwrap_or(CompiledDefaults::CONFIDENCE_THRESHOLD);
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(Error::InvalidInput(format!(
            "Confidence threshold must be between 0.0 and 1.0, got {}",
            confidence_threshold
        )));
    }

    Ok(ResolvedConfig {
        face_api: FaceApiConfig {
            base_url,
            subscription_key,
            person_group_id,
            request_timeout,
            max_candidates: CompiledDefaults::MAX_CANDIDATES,
            confidence_threshold,
        },
        lookup_interval: Duration::from_secs(lookup_interval_secs),
        logging: toml_config.logging.clone(),
    })
}

/// Per-request timeout: CLI → TOML → default
///
/// Zero would fail every request before it is sent, so it is rejected.
pub fn resolve_request_timeout(
    cli_secs: Option<u64>,
    toml_config: &TomlConfig,
) -> Result<Duration> {
    let secs = cli_secs
        .or(toml_config.request_timeout_secs)
        .unwrap_or(CompiledDefaults::REQUEST_TIMEOUT_SECS);
    if secs == 0 {
        return Err(Error::InvalidInput(
            "Request timeout must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Resolve the subscription key, reporting where it came from
fn resolve_subscription_key(
    cli_key: Option<&str>,
    env_key: Option<String>,
    toml_key: Option<&str>,
) -> Result<String> {
    let candidates = [
        ("command line", cli_key.map(str::to_string)),
        ("environment", env_key),
        ("TOML", toml_key.map(str::to_string)),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, key)| key.as_deref().is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "Subscription key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    for (source, key) in candidates {
        if let Some(key) = key.filter(|k| is_valid_key(k)) {
            info!("Subscription key loaded from {}", source);
            return Ok(key);
        }
    }

    Err(Error::Config(format!(
        "Face API subscription key not configured. Please configure using one of:\n\
         1. Command line: --subscription-key <key>\n\
         2. Environment: {}=your-key-here\n\
         3. TOML config: ~/.config/facetag/facetag.toml (subscription_key = \"your-key\")",
        SUBSCRIPTION_KEY_ENV
    )))
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn first_valid(values: &[Option<String>]) -> Option<String> {
    values
        .iter()
        .flatten()
        .find(|v| is_valid_key(v))
        .map(|v| v.trim().to_string())
}
