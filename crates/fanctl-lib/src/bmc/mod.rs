//! BMC fan control
//!
//! This module provides:
//! - the [`FanController`] trait the orchestrator drives
//! - [`BmcSession`], the HTTPS implementation against the BMC web API

mod client;
mod types;

pub use client::{BmcSession, BROWSER_USER_AGENT};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::FanMode;

/// Fan operations against one host.
///
/// `login` must succeed before any other call.
#[async_trait]
pub trait FanController: Send + Sync {
    /// Establish an authenticated session
    async fn login(&mut self) -> Result<()>;

    /// Switch the control mode
    async fn set_fan_mode(&self, mode: FanMode) -> Result<()>;

    /// Apply a duty cycle to every fan, returning how many fans accepted it
    async fn set_fan_speed(&self, duty: u8) -> Result<usize>;

    /// Read current fan status; `None` when the device reports no fan list
    async fn fan_status(&self) -> Result<Option<Vec<Value>>>;
}
