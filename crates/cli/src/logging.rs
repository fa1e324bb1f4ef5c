//! Tracing subscriber setup: stdout plus an append-only log file

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::{prelude::*, EnvFilter, Layer, Registry};

/// Log line format, applied to both sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// "YYYY-MM-DD HH:MM:SS  LEVEL message" lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

// Local wall-clock timestamps: "YYYY-MM-DD HH:MM:SS"
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. The log file is created if
/// missing and always appended to.
pub fn init(level: &str, log_file: &Path, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{}'", level))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let layers: Vec<BoxedLayer> = match format {
        LogFormat::Text => vec![
            fmt::layer().with_timer(LocalTime).with_target(false).boxed(),
            fmt::layer()
                .with_timer(LocalTime)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        ],
        LogFormat::Json => vec![
            fmt::layer().json().with_timer(LocalTime).boxed(),
            fmt::layer()
                .json()
                .with_timer(LocalTime)
                .with_writer(Mutex::new(file))
                .boxed(),
        ],
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
