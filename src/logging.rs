//! Structured JSON logging routed by level.
//!
//! INFO, DEBUG and TRACE events go to the `cli.stdout` targets, WARN and ERROR
//! events to the `cli.stderr` targets. A target is `stdout`, `stderr` or a file
//! path opened in append mode.
use crate::config::CliConfig;
use crate::error::ResultMessage;
use crate::error::SheetSqlError;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn parse(target: &str) -> Self {
        match target.trim() {
            "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }

    pub fn open(&self) -> Result<BoxMakeWriter, SheetSqlError> {
        match self {
            LogTarget::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
            LogTarget::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(SheetSqlError::from)
                    .with_prefix(&format!("Open log file '{}'", path.display()))?;
                Ok(BoxMakeWriter::new(Arc::new(file)))
            }
        }
    }
}

/// Copies every event to all writers. An empty list discards events.
fn fan_out(writers: Vec<BoxMakeWriter>) -> BoxMakeWriter {
    writers
        .into_iter()
        .reduce(|all, next| BoxMakeWriter::new(all.and(next)))
        .unwrap_or_else(|| BoxMakeWriter::new(std::io::sink))
}

/// Sends INFO and more verbose events to `stdout`, WARN and ERROR to `stderr`.
fn split_by_level(stdout: BoxMakeWriter, stderr: BoxMakeWriter) -> BoxMakeWriter {
    BoxMakeWriter::new(
        stdout
            .with_min_level(Level::INFO)
            .and(stderr.with_max_level(Level::WARN)),
    )
}

/// Opens every configured target and routes events to them by level.
pub fn open_writer(config: &CliConfig) -> Result<BoxMakeWriter, SheetSqlError> {
    let open_all = |targets: &[String]| {
        targets
            .iter()
            .map(|target| LogTarget::parse(target).open())
            .collect::<Result<Vec<_>, _>>()
            .map(fan_out)
    };
    Ok(split_by_level(
        open_all(config.stdout.as_slice())?,
        open_all(config.stderr.as_slice())?,
    ))
}

/// Installs the global JSON subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init(config: &CliConfig) -> Result<(), SheetSqlError> {
    let writer = open_writer(config)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| SheetSqlError::WithContextError(format!("Initialize logging failed: {}", e)))
}
