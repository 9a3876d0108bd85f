//! Shell error types

use thiserror::Error;

/// Errors that can occur in the web shell
#[derive(Error, Debug)]
pub enum ShellError {
    /// IO error (persistence, profile wipe, relaunch)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed entry in the permission file
    ///
    /// Non-fatal: produced while loading, logged, and the entry is skipped.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the file
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The permission file exists but could not be read at load, so it is
    /// not overwritten
    #[error("Permission file {0:?} could not be read; refusing to overwrite it")]
    UnreadableStore(std::path::PathBuf),

    /// A URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Feature name not recognised by this build
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Decision value other than granted/denied
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    /// The relaunch flow could not start a new instance
    #[error("Relaunch failed: {0}")]
    Relaunch(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ShellError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        ShellError::Other(msg.into())
    }

    /// Create a parse error for a given line
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        ShellError::Parse {
            line,
            message: msg.into(),
        }
    }
}

/// Result type alias for shell operations
pub type ShellResult<T> = Result<T, ShellError>;
