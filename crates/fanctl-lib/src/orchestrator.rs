//! Run orchestration
//!
//! One linear pass: classify today, load the host list, pick the target,
//! then drive every host in file order. A host that fails is recorded and
//! skipped; it never stops the run.

use chrono::NaiveDate;
use std::fmt;

use crate::bmc::{BmcSession, FanController};
use crate::config::load_configs;
use crate::error::{FanError, Result};
use crate::holiday::HolidayResolver;
use crate::models::{FanMode, HostConfig, TargetSpec};
use crate::observability::RunLogger;
use crate::settings::Settings;

/// Why a target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Cli,
    DayOff,
    FirstHost,
}

/// Step of a host iteration, recorded on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStage {
    Connect,
    Login,
    SetMode,
    SetSpeed,
    Status,
}

impl fmt::Display for HostStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostStage::Connect => "connect",
            HostStage::Login => "login",
            HostStage::SetMode => "set_mode",
            HostStage::SetSpeed => "set_speed",
            HostStage::Status => "status",
        };
        f.write_str(name)
    }
}

/// Result of one host iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    /// Fans handed to BMC control
    Auto,
    /// Manual duty applied to `fans_set` of `fans_total` fans
    Manual {
        duty: u8,
        fans_set: usize,
        fans_total: u8,
    },
    Failed {
        stage: HostStage,
        error: String,
    },
}

impl HostOutcome {
    /// Every requested change was applied
    pub fn is_complete(&self) -> bool {
        match self {
            HostOutcome::Auto => true,
            HostOutcome::Manual {
                fans_set,
                fans_total,
                ..
            } => *fans_set == usize::from(*fans_total),
            HostOutcome::Failed { .. } => false,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, HostOutcome::Failed { .. })
    }
}

/// Outcome of one configured host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    /// Position in the configuration file, zero based
    pub index: usize,
    pub host: String,
    pub description: String,
    pub outcome: HostOutcome,
}

/// Aggregated result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub target: TargetSpec,
    pub reports: Vec<HostReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_complete())
            .count()
    }

    /// Hosts where only some fans accepted the duty
    pub fn degraded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| !r.outcome.is_complete() && !r.outcome.is_failed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

/// Pick the run target.
///
/// An explicit CLI value wins without looking at the calendar. Otherwise a
/// day off means `Auto`, and a workday takes `fan_speed` from the first
/// configuration entry only.
pub fn resolve_target(
    cli_target: Option<TargetSpec>,
    day_off: bool,
    hosts: &[HostConfig],
) -> Result<(TargetSpec, TargetSource)> {
    if let Some(target) = cli_target {
        return Ok((target, TargetSource::Cli));
    }

    if day_off {
        return Ok((TargetSpec::Auto, TargetSource::DayOff));
    }

    hosts
        .first()
        .and_then(HostConfig::duty)
        .map(|duty| (TargetSpec::Duty(duty), TargetSource::FirstHost))
        .ok_or_else(|| {
            FanError::Validation(
                "no fan speed given and the first configuration entry has no fan_speed"
                    .to_string(),
            )
        })
}

/// Drive one host through login, mode/speed change and status read
pub async fn apply_to_host<C: FanController>(
    controller: &mut C,
    host: &HostConfig,
    target: TargetSpec,
) -> std::result::Result<HostOutcome, (HostStage, FanError)> {
    controller
        .login()
        .await
        .map_err(|e| (HostStage::Login, e))?;

    let outcome = match target {
        TargetSpec::Auto => {
            controller
                .set_fan_mode(FanMode::Auto)
                .await
                .map_err(|e| (HostStage::SetMode, e))?;
            HostOutcome::Auto
        }
        TargetSpec::Duty(run_duty) => {
            let duty = host.duty().unwrap_or(run_duty);
            controller
                .set_fan_mode(FanMode::Manual)
                .await
                .map_err(|e| (HostStage::SetMode, e))?;
            let fans_set = controller
                .set_fan_speed(duty)
                .await
                .map_err(|e| (HostStage::SetSpeed, e))?;
            HostOutcome::Manual {
                duty,
                fans_set,
                fans_total: host.fan_count(),
            }
        }
    };

    controller
        .fan_status()
        .await
        .map_err(|e| (HostStage::Status, e))?;

    Ok(outcome)
}

/// Process `hosts` in order with a fresh controller per host
pub async fn run_hosts<C, F>(
    hosts: &[HostConfig],
    target: TargetSpec,
    mut connect: F,
    logger: &RunLogger,
) -> RunSummary
where
    C: FanController,
    F: FnMut(&HostConfig) -> Result<C>,
{
    let mut reports = Vec::with_capacity(hosts.len());

    for (index, host) in hosts.iter().enumerate() {
        logger.log_host_start(index, hosts.len(), host);

        let outcome = match connect(host) {
            Ok(mut controller) => match apply_to_host(&mut controller, host, target).await {
                Ok(outcome) => outcome,
                Err((stage, e)) => HostOutcome::Failed {
                    stage,
                    error: e.to_string(),
                },
            },
            Err(e) => HostOutcome::Failed {
                stage: HostStage::Connect,
                error: e.to_string(),
            },
        };

        let report = HostReport {
            index,
            host: host.bmc_host.clone(),
            description: host.display_name().to_string(),
            outcome,
        };
        logger.log_host_outcome(&report);
        reports.push(report);
    }

    RunSummary { target, reports }
}

/// Full run against the BMC web API
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    holidays: &'a HolidayResolver,
    logger: &'a RunLogger,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings, holidays: &'a HolidayResolver, logger: &'a RunLogger) -> Self {
        Self {
            settings,
            holidays,
            logger,
        }
    }

    /// Execute one run for `today`.
    ///
    /// Fails only when no target can be resolved; host failures are part of
    /// the returned summary.
    pub async fn run(&self, cli_target: Option<TargetSpec>, today: NaiveDate) -> Result<RunSummary> {
        let decision = self.holidays.resolve(today).await;
        self.logger.log_holiday_decision(&decision);

        let hosts = load_configs(&self.settings.config_path);

        let (target, source) = match resolve_target(cli_target, decision.is_day_off(), &hosts) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.logger.log_target_unresolved(&e);
                return Err(e);
            }
        };
        self.logger.log_target(target, source);

        if hosts.is_empty() {
            self.logger.log_no_hosts();
        } else if self.settings.accept_invalid_certs {
            self.logger.log_tls_verification_disabled();
        }

        let client_settings = self.settings.client_settings();
        let summary = run_hosts(
            &hosts,
            target,
            |host| BmcSession::new(host, &client_settings),
            self.logger,
        )
        .await;

        self.logger.log_run_complete(&summary);
        Ok(summary)
    }
}
