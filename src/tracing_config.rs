use std::{env, error::Error, io};

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigPaths, LogFormat, LogLevel};

const LOG_FORMAT_VAR: &str = "NOWPLAYING_LOG_FORMAT";
const DAYS_TO_KEEP: usize = 7;

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

fn effective_format(configured: LogFormat) -> LogFormat {
    env::var(LOG_FORMAT_VAR)
        .ok()
        .and_then(|value| LogFormat::parse(&value))
        .unwrap_or(configured)
}

/// Initialize tracing on stderr.
///
/// `RUST_LOG` wins over `level` and `NOWPLAYING_LOG_FORMAT` over `format`
/// when set. Logs go to stderr so stdout stays free for event output.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(level: LogLevel, format: LogFormat) -> Result<(), Box<dyn Error>> {
    let json = effective_format(format) == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(io::stderr)
        }))
        .with((!json).then(|| {
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
        }))
        .try_init()?;

    Ok(())
}

/// Initialize tracing on stderr and a daily-rotated file in the log directory.
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive for the lifetime of the program.
///
/// # Errors
/// Returns error if the log directory cannot be created or a global
/// subscriber is already installed
pub fn init_with_file(level: LogLevel, format: LogFormat) -> Result<WorkerGuard, Box<dyn Error>> {
    let json = effective_format(format) == LogFormat::Json;

    let log_dir = ConfigPaths::log_dir()?;
    let appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("nowplaying")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(io::stderr)
        }))
        .with((!json).then(|| {
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
        }))
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer.clone())
        }))
        .with((!json).then(|| {
            fmt::layer()
                .compact()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer)
        }))
        .try_init()?;

    Ok(guard)
}
