//! Configuration loading and service URL resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Compiled-in default when nothing else is configured.
///
/// Matches the processing service's default listen port.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

/// Environment variable consulted during URL resolution
pub const SERVICE_URL_ENV: &str = "TDASH_SERVICE_URL";

/// TOML configuration file contents (`~/.config/tdash/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the processing service
    pub service_url: Option<String>,
}

/// Service URL resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`TDASH_SERVICE_URL`)
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_service_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        debug!("Service URL from command line: {}", url);
        return normalize_base_url(url);
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
        if !url.trim().is_empty() {
            debug!("Service URL from environment: {}", url);
            return normalize_base_url(&url);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_toml_config() {
        if let Some(url) = config.service_url {
            if !url.trim().is_empty() {
                debug!("Service URL from TOML config: {}", url);
                return normalize_base_url(&url);
            }
        }
    }

    // Priority 4: Compiled default
    info!("Service URL not configured, using default {}", DEFAULT_SERVICE_URL);
    DEFAULT_SERVICE_URL.to_string()
}

/// Load the TOML config file, if one exists
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load TOML config from an explicit path (used by tests and `--config`)
pub fn load_toml_config_from(path: &std::path::Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Default configuration file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("tdash").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Strip a trailing slash so path joining stays predictable
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(normalize_base_url("http://host:8080/"), "http://host:8080");
        assert_eq!(normalize_base_url("http://host:8080"), "http://host:8080");
        assert_eq!(normalize_base_url("  http://host/ "), "http://host");
    }

    #[test]
    fn cli_argument_wins() {
        let url = resolve_service_url(Some("http://cli-host:9999/"));
        assert_eq!(url, "http://cli-host:9999");
    }
}
