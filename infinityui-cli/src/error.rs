//! CLI error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use infinityui::config::ConfigError;
use infinityui::logging::LoggingError;
use infinityui::SessionError;

/// Errors surfaced to the command line.
#[derive(Debug)]
pub enum CliError {
    /// The configuration file could not be loaded.
    Config(ConfigError),

    /// The logger could not be installed.
    Logging(LoggingError),

    /// The patch session failed.
    Session(SessionError),

    /// A scene snapshot could not be read or written.
    Scene(serde_json::Error),

    /// A file could not be read or written.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Session(e) => write!(f, "Patch session failed: {}", e),
            CliError::Scene(e) => write!(f, "Invalid scene snapshot: {}", e),
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Scene(e) => Some(e),
            CliError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Scene(e)
    }
}
