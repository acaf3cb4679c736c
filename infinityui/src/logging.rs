//! Logging setup.
//!
//! The loader logs through `tracing`; this installs the subscriber. With a
//! log file configured, output goes through a non-blocking appender whose
//! [`WorkerGuard`] flushes on drop, so hold on to it for as long as logs
//! should be written.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Errors installing the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// The log file path has no file name.
    #[error("Invalid log file path: {0}")]
    InvalidPath(PathBuf),

    /// A global subscriber is already installed.
    #[error("Failed to install logger: {0}")]
    Install(String),
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();
    let timer = OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        Rfc3339,
    );

    let Some(path) = &config.file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(timer)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| LoggingError::Install(e.to_string()))?;
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.clone()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(Some(guard))
}
