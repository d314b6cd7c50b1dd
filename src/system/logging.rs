//! Logging system initialization

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::errors::{LinkpressError, Result};

const DEFAULT_LOG_NAME: &str = "linkpress.log";

/// Initialize the global tracing subscriber.
///
/// Output goes to stdout unless `logging.file` is set; with
/// `enable_rotation` the file is rolled daily and at most `max_backups`
/// files are kept. The returned guard must live until the process exits,
/// otherwise buffered lines are lost.
///
/// Call once, after the configuration has been loaded.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let log_file = config.file.as_deref().filter(|f| !f.is_empty());

    let writer: Box<dyn std::io::Write + Send + Sync> = match log_file {
        Some(path) if config.enable_rotation => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or(DEFAULT_LOG_NAME);
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .max_log_files(config.max_backups.max(1) as usize)
                .build(dir)
                .map_err(|e| {
                    LinkpressError::config(format!("Failed to create rolling log appender: {}", e))
                })?;
            Box::new(appender)
        }
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(log_file.is_none());

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed
        .map_err(|e| LinkpressError::config(format!("Failed to install log subscriber: {}", e)))?;

    Ok(guard)
}
