//! Structured run logging
//!
//! [`RunLogger`] is created once per process and handed to the orchestrator.
//! It emits the run-level events; individual BMC calls log through `tracing`
//! directly.

use tracing::{error, info, warn};

use crate::error::FanError;
use crate::holiday::{DecisionSource, HolidayDecision};
use crate::models::{HostConfig, TargetSpec};
use crate::orchestrator::{HostOutcome, HostReport, RunSummary, TargetSource};

/// Structured logger for run events
#[derive(Clone)]
pub struct RunLogger {
    run_id: String,
}

impl RunLogger {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Log process start
    pub fn log_run_start(&self, version: &str, cli_target: Option<TargetSpec>) {
        match cli_target {
            Some(target) => info!(
                event = "run_started",
                run_id = %self.run_id,
                version = %version,
                cli_target = %target,
                "Fan control run started"
            ),
            None => info!(
                event = "run_started",
                run_id = %self.run_id,
                version = %version,
                "Fan control run started, target follows the calendar"
            ),
        }
    }

    /// Log the day-off policy outcome
    pub fn log_holiday_decision(&self, decision: &HolidayDecision) {
        let source = match decision.source {
            DecisionSource::Remote => "remote",
            DecisionSource::Fallback => "fallback",
        };

        info!(
            event = "holiday_decision",
            run_id = %self.run_id,
            date = %decision.date,
            weekend = decision.weekend,
            day_kind = ?decision.day_kind,
            source = source,
            day_off = decision.is_day_off(),
            "Calendar checked"
        );
    }

    /// Log the resolved target and why it was chosen
    pub fn log_target(&self, target: TargetSpec, source: TargetSource) {
        let reason = match source {
            TargetSource::Cli => "given on the command line",
            TargetSource::DayOff => "weekend or public holiday",
            TargetSource::FirstHost => "fan_speed of the first configuration entry",
        };

        info!(
            event = "target_resolved",
            run_id = %self.run_id,
            target = %target,
            reason = reason,
            "Target resolved"
        );
    }

    /// Log a target that could not be resolved; the run stops here
    pub fn log_target_unresolved(&self, err: &FanError) {
        error!(
            event = "target_unresolved",
            run_id = %self.run_id,
            error = %err,
            "No fan speed given and none configured"
        );
    }

    /// Warn the operator that BMC certificates are not verified
    pub fn log_tls_verification_disabled(&self) {
        warn!(
            event = "tls_verification_disabled",
            run_id = %self.run_id,
            "TLS certificate verification is disabled for BMC connections"
        );
    }

    /// Log an empty host list
    pub fn log_no_hosts(&self) {
        warn!(
            event = "no_hosts",
            run_id = %self.run_id,
            "No hosts configured, nothing to do"
        );
    }

    /// Log the start of one host iteration
    pub fn log_host_start(&self, index: usize, total: usize, host: &HostConfig) {
        info!(
            event = "host_started",
            run_id = %self.run_id,
            bmc = %host.bmc_host,
            "===== config {}/{} - {} =====",
            index + 1,
            total,
            host.display_name()
        );
    }

    /// Log how one host ended
    pub fn log_host_outcome(&self, report: &HostReport) {
        match &report.outcome {
            HostOutcome::Auto => info!(
                event = "host_finished",
                run_id = %self.run_id,
                bmc = %report.host,
                "Fans on {} handed to automatic control",
                report.host
            ),
            HostOutcome::Manual {
                duty,
                fans_set,
                fans_total,
            } if report.outcome.is_complete() => info!(
                event = "host_finished",
                run_id = %self.run_id,
                bmc = %report.host,
                duty = duty,
                "All fans on {} set ({}/{})",
                report.host,
                fans_set,
                fans_total
            ),
            HostOutcome::Manual {
                duty,
                fans_set,
                fans_total,
            } => warn!(
                event = "host_degraded",
                run_id = %self.run_id,
                bmc = %report.host,
                duty = duty,
                "Some fans on {} were not set ({}/{})",
                report.host,
                fans_set,
                fans_total
            ),
            HostOutcome::Failed { stage, error } => error!(
                event = "host_failed",
                run_id = %self.run_id,
                bmc = %report.host,
                stage = %stage,
                error = %error,
                "Config {} failed",
                report.index + 1
            ),
        }
    }

    /// Log run completion
    pub fn log_run_complete(&self, summary: &RunSummary) {
        info!(
            event = "run_finished",
            run_id = %self.run_id,
            target = %summary.target,
            hosts = summary.reports.len(),
            succeeded = summary.succeeded(),
            degraded = summary.degraded(),
            failed = summary.failed(),
            "All configurations processed"
        );
    }
}
