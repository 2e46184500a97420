//! Optional tracing subscriber for applications using vsts-client.
//!
//! The client itself only emits `tracing` events:
//! request lines and bodies at `debug`, rejected requests at `warn`.
//! Nothing is written anywhere until a subscriber is installed, either
//! through [`init_logging`] or by the application.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LEVEL_ENV: &str = "VSTS_LOG_LEVEL";
const FILE_ENV: &str = "VSTS_LOG_FILE";
const FORMAT_ENV: &str = "VSTS_LOG_FORMAT";

/// Verbosity of this crate's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Case-insensitive; `warning` is accepted for `warn`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Filter directive limited to this crate, so reqwest and hyper stay quiet.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        format!("vsts_client={level}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where and how to write events. `level: None` disables logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Option<LogLevel>,
    /// Appended to when set, stderr otherwise.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Reads `VSTS_LOG_LEVEL`, `VSTS_LOG_FILE` and `VSTS_LOG_FORMAT`.
    ///
    /// Unknown level or format values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(LEVEL_ENV).ok().as_deref(),
            std::env::var(FILE_ENV).ok().as_deref(),
            std::env::var(FORMAT_ENV).ok().as_deref(),
        )
    }

    fn from_values(level: Option<&str>, file: Option<&str>, format: Option<&str>) -> Self {
        Self {
            level: level.and_then(LogLevel::parse),
            file: file.filter(|s| !s.is_empty()).map(PathBuf::from),
            format: format.and_then(LogFormat::parse).unwrap_or_default(),
        }
    }
}

/// Flushes buffered events when dropped. Hold it until exit.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Installs a global subscriber for this crate's events.
///
/// Returns `None` when logging is disabled, the log file cannot be opened,
/// or another global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use vsts_client::logging::{LogConfig, LogLevel, init_logging};
///
/// let _guard = init_logging(LogConfig {
///     level: Some(LogLevel::Debug),
///     ..LogConfig::from_env()
/// });
/// ```
#[must_use = "the returned guard must be held until application exit"]
pub fn init_logging(config: LogConfig) -> Option<LogGuard> {
    let level = config.level?;
    let filter = EnvFilter::new(level.directive());

    let (writer, worker) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    // Source locations are only worth the noise in files.
    let locations = config.file.is_some();

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(locations)
                    .with_line_number(locations),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(locations)
                    .with_line_number(locations),
            )
            .try_init(),
    };
    installed.ok()?;

    Some(LogGuard { _worker: worker })
}
