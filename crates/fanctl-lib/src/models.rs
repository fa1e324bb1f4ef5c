//! Core data models for fan control runs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{FanError, Result};

/// Upper bound for both duty cycle and fan count
pub const MAX_PERCENT: i64 = 100;

/// One BMC entry of the host configuration file
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    pub bmc_host: String,
    pub username: String,
    pub password: String,
    pub fans_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HostConfig {
    /// Number of fans to drive, clamped to `[0, 100]`
    pub fn fan_count(&self) -> u8 {
        clamp_percent(self.fans_count)
    }

    /// Host-specific duty cycle, clamped to `[0, 100]`
    pub fn duty(&self) -> Option<u8> {
        self.fan_speed.map(clamp_percent)
    }

    /// Human-readable label used in log banners and summaries
    pub fn display_name(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("unnamed server")
    }

    /// Base URL of the BMC web API.
    ///
    /// A bare host or IP gets `https://`; an explicit `http(s)://` URL is kept.
    pub fn base_url(&self) -> Result<Url> {
        let host = self.bmc_host.trim();
        if host.is_empty() {
            return Err(FanError::Config("bmc_host is empty".to_string()));
        }

        let mut raw = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        if !raw.ends_with('/') {
            raw.push('/');
        }

        Url::parse(&raw).map_err(|e| FanError::Config(format!("invalid bmc_host {:?}: {}", host, e)))
    }

    /// True when a stored value lies outside `[0, 100]` and will be clamped
    pub fn needs_clamping(&self) -> bool {
        !(0..=MAX_PERCENT).contains(&self.fans_count)
            || self
                .fan_speed
                .map(|s| !(0..=MAX_PERCENT).contains(&s))
                .unwrap_or(false)
    }
}

// Credentials stay out of logs
impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("bmc_host", &self.bmc_host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("fans_count", &self.fans_count)
            .field("fan_speed", &self.fan_speed)
            .field("description", &self.description)
            .finish()
    }
}

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, MAX_PERCENT) as u8
}

/// What a run should do to every host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// Hand fan control back to the BMC
    Auto,
    /// Fixed duty cycle in percent
    Duty(u8),
}

impl FromStr for TargetSpec {
    type Err = FanError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(TargetSpec::Auto);
        }

        let value: i64 = s
            .parse()
            .map_err(|_| FanError::Validation(format!("expected a number or 'auto', got {:?}", s)))?;

        if !(0..=MAX_PERCENT).contains(&value) {
            return Err(FanError::Validation(format!(
                "fan speed must be between 0 and 100, got {}",
                value
            )));
        }

        Ok(TargetSpec::Duty(value as u8))
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Auto => write!(f, "auto"),
            TargetSpec::Duty(d) => write!(f, "{}%", d),
        }
    }
}

/// Fan control mode understood by the BMC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Manual,
    Auto,
}

impl FanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanMode::Manual => "manual",
            FanMode::Auto => "auto",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
