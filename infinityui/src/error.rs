//! Session error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for patch sessions.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that end a patch session.
///
/// Per-asset problems never show up here: conflicts abort a single asset
/// and the walk carries on. Only failures that leave nothing sensible to
/// continue with are fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The game directory could not be determined.
    #[error("Failed to determine game directory: {0}")]
    GameDir(#[source] io::Error),

    /// The override tree could not be enumerated.
    #[error("Failed to enumerate override tree at {root}: {source}")]
    Enumeration { root: PathBuf, source: io::Error },
}
