//! BMC fan control runner
//!
//! Sets every configured server's fans to a fixed duty cycle on workdays and
//! hands them back to the BMC on weekends and public holidays. Meant to be
//! invoked from a scheduler.

mod logging;
mod output;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use fanctl_lib::{HolidayResolver, Orchestrator, RunLogger, RunSummary, Settings, TargetSpec};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// BMC fan control runner
#[derive(Parser)]
#[command(name = "fanctl")]
#[command(author, version, about = "Apply a fan duty cycle or automatic mode to BMC-managed servers", long_about = None)]
pub struct Cli {
    /// Fan duty percentage (0-100) or "auto"; chosen from the calendar when omitted
    pub target: Option<TargetSpec>,

    /// Host list (JSON array or single object)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Append-only log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log line format
    #[arg(long, env = "FANCTL_LOG_FORMAT", default_value = "text")]
    pub log_format: logging::LogFormat,

    /// Verify BMC TLS certificates
    #[arg(long)]
    pub verify_tls: bool,

    /// Holiday lookup endpoint
    #[arg(long)]
    pub holiday_api_url: Option<String>,
}

impl Cli {
    /// Layer command-line overrides on top of environment settings
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load().context("Invalid FANCTL_* settings")?;
        if let Some(path) = &self.config {
            settings.config_path = path.clone();
        }
        if let Some(path) = &self.log_file {
            settings.log_file = path.clone();
        }
        if let Some(url) = &self.holiday_api_url {
            settings.holiday_api_url = url.clone();
        }
        if self.verify_tls {
            settings.accept_invalid_certs = false;
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            output::print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let settings = cli.settings()?;
    logging::init(&settings.log_level, &settings.log_file, cli.log_format)?;
    debug!(?settings, "Settings loaded");

    let logger = RunLogger::new(Local::now().format("%Y%m%d-%H%M%S").to_string());
    logger.log_run_start(VERSION, cli.target);

    let holidays = HolidayResolver::new(settings.holiday_api_url.clone(), settings.holiday_timeout())
        .context("Failed to build holiday lookup client")?;

    let summary = Orchestrator::new(&settings, &holidays, &logger)
        .run(cli.target, Local::now().date_naive())
        .await?;

    Ok(summary)
}
