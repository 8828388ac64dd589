//! Tracing subscriber setup.
//!
//! Logs always go to stdout. Setting `LOG_DIR` also writes daily rolling files there (see
//! `LOG_MAX_FILES`), and `LOG_FORMAT=json` switches both outputs to JSON lines.

use std::{env, sync::OnceLock};

use tracing::Level;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        fmt,
        time::ChronoLocal,
        writer::{BoxMakeWriter, MakeWriterExt},
    },
};

use crate::error::AppError;

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "team-finder.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flushes the file writer when the process exits.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    filter: String,
    dir: Option<String>,
    max_files: Option<usize>,
    json: bool,
}

impl LogSettings {
    fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            filter: var("RUST_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            dir: var("LOG_DIR").filter(|d| !d.trim().is_empty()),
            max_files: var("LOG_MAX_FILES").and_then(|v| v.parse().ok()),
            json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

pub fn init() -> Result<(), AppError> {
    let settings = LogSettings::from_env();

    let filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let writer = match &settings.dir {
        Some(dir) => {
            let file = file_writer(dir, settings.max_files)?;
            BoxMakeWriter::new(std::io::stdout.with_max_level(Level::INFO).and(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_level(true)
        .with_writer(writer);

    let res = if settings.json {
        builder.json().try_init()
    } else {
        // Colour codes would end up in the log files.
        builder.with_ansi(settings.dir.is_none()).try_init()
    };
    res.map_err(|e| AppError::Config(format!("cannot install logger: {e}")))?;

    tracing::info!(
        log_dir = settings.dir.as_deref(),
        json = settings.json,
        "📝 Logger initialized"
    );
    Ok(())
}

fn file_writer(dir: &str, max_files: Option<usize>) -> Result<NonBlocking, AppError> {
    let mut appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX);
    if let Some(n) = max_files {
        appender = appender.max_log_files(n);
    }

    let appender = appender
        .build(dir)
        .map_err(|e| AppError::Config(format!("cannot create log file in {dir}: {e}")))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    FILE_GUARD
        .set(guard)
        .map_err(|_| AppError::Config("logger initialized twice".into()))?;

    Ok(writer)
}
