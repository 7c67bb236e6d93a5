//! Structured logging setup.
//!
//! Builds a `tracing` subscriber from [`LoggingConfig`]: one formatted layer
//! per enabled output (stdout and/or a non-blocking file), filtered by the
//! configured level unless `RUST_LOG` says otherwise.


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}

impl From<LogError> for crate::BazaarError {
    fn from(err: LogError) -> Self {
        crate::BazaarError::Logging(err.to_string())
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Keeps the file writer flushing. Drop it only at shutdown.
#[derive(Debug, Default)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the global subscriber. A second call leaves the first
/// subscriber in place.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.stdout {
        layers.push(format_layer(config.format, std::io::stdout, true));
    }

    let mut guard = LogGuard::default();
    if let Some(file_path) = &config.file {
        let (writer, file_guard) = create_non_blocking_file(file_path)?;
        layers.push(format_layer(config.format, writer, false));
        guard._file = Some(file_guard);
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        tracing::debug!("Logging already initialized: {}", e);
    }

    Ok(guard)
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Default => layer.boxed(),
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::IoError(std::io::Error::other("log file path has no file name")))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level
        .parse()
        .map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}
