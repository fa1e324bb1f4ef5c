//! Host configuration file loading
//!
//! The file holds either a JSON array of host entries or a single entry
//! object. Loading never fails: a missing or broken file yields an empty
//! list, which callers treat as "nothing to do".

use serde::Deserialize;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::{FanError, Result};
use crate::models::HostConfig;

/// Accepts both `[{...}, {...}]` and `{...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Many(Vec<HostConfig>),
    One(HostConfig),
}

impl From<ConfigFile> for Vec<HostConfig> {
    fn from(file: ConfigFile) -> Self {
        match file {
            ConfigFile::Many(hosts) => hosts,
            ConfigFile::One(host) => vec![host],
        }
    }
}

/// Load the ordered host list, degrading every failure to an empty list
pub fn load_configs(path: &Path) -> Vec<HostConfig> {
    match try_load_configs(path) {
        Ok(hosts) => {
            info!(path = %path.display(), hosts = hosts.len(), "Loaded host configuration");
            for (index, host) in hosts.iter().enumerate() {
                if host.needs_clamping() {
                    warn!(
                        entry = index + 1,
                        bmc_host = %host.bmc_host,
                        fans_count = host.fans_count,
                        fan_speed = ?host.fan_speed,
                        "Values outside 0-100 will be clamped"
                    );
                }
            }
            hosts
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to load host configuration");
            Vec::new()
        }
    }
}

/// Strict variant of [`load_configs`] that reports why loading failed
pub fn try_load_configs(path: &Path) -> Result<Vec<HostConfig>> {
    if !path.exists() {
        return Err(FanError::Config(format!("{} not found", path.display())));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| FanError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse_configs(&content)
}

/// Parse host entries from JSON text
pub fn parse_configs(content: &str) -> Result<Vec<HostConfig>> {
    let file: ConfigFile = serde_json::from_str(content)
        .map_err(|e| FanError::Config(format!("failed to parse host configuration: {}", e)))?;
    Ok(file.into())
}
