//! Output formatting utilities

use colored::Colorize;
use fanctl_lib::{HostOutcome, HostReport, RunSummary};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "BMC")]
    host: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&HostReport> for HostRow {
    fn from(report: &HostReport) -> Self {
        let (result, detail) = match &report.outcome {
            HostOutcome::Auto => ("auto".green().to_string(), String::new()),
            HostOutcome::Manual {
                duty,
                fans_set,
                fans_total,
            } => {
                let detail = format!("{}% on {}/{} fans", duty, fans_set, fans_total);
                if report.outcome.is_complete() {
                    ("manual".green().to_string(), detail)
                } else {
                    ("degraded".yellow().to_string(), detail)
                }
            }
            HostOutcome::Failed { stage, error } => {
                ("failed".red().to_string(), format!("{}: {}", stage, error))
            }
        };

        Self {
            index: report.index + 1,
            host: report.host.clone(),
            description: report.description.clone(),
            result,
            detail,
        }
    }
}

/// Print the per-host table and totals
pub fn print_summary(summary: &RunSummary) {
    if summary.reports.is_empty() {
        print_warning("No hosts configured");
        return;
    }

    let rows: Vec<HostRow> = summary.reports.iter().map(HostRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    let totals = format!(
        "target {}: {} ok, {} degraded, {} failed",
        summary.target,
        summary.succeeded(),
        summary.degraded(),
        summary.failed()
    );
    if summary.failed() == 0 && summary.degraded() == 0 {
        print_success(&totals);
    } else {
        print_warning(&totals);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
