//! Fan control library for BMC-managed servers
//!
//! This crate provides the core functionality for:
//! - Loading the host list and runtime settings
//! - Deciding whether today is a weekend or public holiday
//! - Authenticated sessions against the BMC web API
//! - Running the per-host fan sequence and summarising the outcome

pub mod bmc;
pub mod config;
pub mod cookie;
pub mod error;
pub mod holiday;
pub mod models;
pub mod observability;
pub mod orchestrator;
pub mod settings;

pub use bmc::{BmcSession, FanController};
pub use error::{FanError, Result};
pub use holiday::{HolidayDecision, HolidayResolver};
pub use models::*;
pub use observability::RunLogger;
pub use orchestrator::{HostOutcome, HostReport, HostStage, Orchestrator, RunSummary, TargetSource};
pub use settings::{ClientSettings, Settings};
