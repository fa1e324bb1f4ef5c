//! Run settings

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// Default public-holiday lookup endpoint
pub const DEFAULT_HOLIDAY_API_URL: &str = "https://tool.bitefu.net/jiari/";

/// Settings shared by every component of a run.
///
/// Read from `FANCTL_*` environment variables; CLI flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Host configuration file
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    /// Append-only log file mirrored from stdout
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Holiday lookup endpoint
    #[serde(default = "default_holiday_api_url")]
    pub holiday_api_url: String,

    /// Holiday lookup timeout in seconds
    #[serde(default = "default_holiday_timeout")]
    pub holiday_timeout_secs: u64,

    /// Skip TLS certificate verification for BMC connections
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Optional per-request timeout for BMC calls (none by default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_config_path() -> PathBuf {
    PathBuf::from("fanSpeed.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("fan_control.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_holiday_api_url() -> String {
    DEFAULT_HOLIDAY_API_URL.to_string()
}

fn default_holiday_timeout() -> u64 {
    5
}

fn default_accept_invalid_certs() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            log_file: default_log_file(),
            log_level: default_log_level(),
            holiday_api_url: default_holiday_api_url(),
            holiday_timeout_secs: default_holiday_timeout(),
            accept_invalid_certs: default_accept_invalid_certs(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from `FANCTL_*` variables.
    ///
    /// Unset variables take their defaults; a variable that is set but
    /// cannot be parsed fails the whole load.
    pub fn load() -> Result<Self> {
        Self::from_env("FANCTL")
    }

    /// Load settings from environment variables carrying `prefix`
    pub fn from_env(prefix: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Settings for BMC session clients
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            accept_invalid_certs: self.accept_invalid_certs,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn holiday_timeout(&self) -> Duration {
        Duration::from_secs(self.holiday_timeout_secs)
    }
}

/// Transport options for one BMC session
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub accept_invalid_certs: bool,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Settings::default().client_settings()
    }
}
