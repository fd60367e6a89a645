//! # Logging Utilities
//!
//! Logging infrastructure for sizelens using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty or JSON output
//! - Environment variable configuration
//! - Log level filtering
//! - An optional log file next to console output
//!
//! Console output goes to stderr so it never mixes with report text written
//! to stdout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sizelens_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=sizelens_core=debug`)
//! - `SIZELENS_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `SIZELENS_LOG_FILE`: Optional path to log file (if not set, logs only to console)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FORMAT_VAR: &str = "SIZELENS_LOG_FORMAT";
const LOG_FILE_VAR: &str = "SIZELENS_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one object per event
    Json,
}

impl LogFormat
{
    /// Format from `SIZELENS_LOG_FORMAT`, falling back to `Pretty`.
    pub fn from_env() -> Self
    {
        env::var(LOG_FORMAT_VAR)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or(LogFormat::Pretty)
    }
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `sizelens_core=debug`)
/// - `SIZELENS_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `SIZELENS_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file
/// directory cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| Level::INFO.to_string());
    init_logging_internal(LogFormat::from_env(), &directives)
}

/// Initialize logging with explicit level and format
///
/// The explicit level takes precedence over `RUST_LOG`.
///
/// ## Example
///
/// ```rust,no_run
/// use sizelens_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_logging_internal(format, &Level::from(level).to_string())
}

/// Filter from `RUST_LOG`-style directives; unparsable input falls back to INFO.
fn build_filter(directives: &str) -> EnvFilter
{
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, filter: EnvFilter, path: &Path) -> Result<BoxedLayer, LoggingError>
{
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_appender = tracing_appender::rolling::daily(directory, path.file_name().unwrap_or_default());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer thread must outlive every event; keep it for the process lifetime.
    std::mem::forget(guard);

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok(layer)
}

/// Internal initialization function
fn init_logging_internal(format: LogFormat, directives: &str) -> Result<(), LoggingError>
{
    let log_file = env::var(LOG_FILE_VAR).ok().map(PathBuf::from);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if let Some(path) = log_file {
        layers.push(file_layer(format, build_filter(directives), &path)?);
    }
    layers.push(console_layer(format, build_filter(directives)));

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
