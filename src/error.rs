//! Application error types.
//!
//! Provides unified error handling with actionable context for the user.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// Audio or lyrics path does not name an existing file
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<PathBuf>,
    },

    /// Malformed tag in a lyrics file
    #[error("Parse error in {file:?} line {line}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<PathBuf>,
        /// 1-based line number of the offending line.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// External player binary is missing or could not be started
    #[error("Could not launch audio player '{program}': {source}")]
    PlayerLaunch {
        /// Program that was spawned.
        program: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// External player stopped with a failure status
    #[error("Audio player '{program}' exited unexpectedly ({status})")]
    PlayerExited {
        /// Program that was running.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// User aborted at a prompt; a clean shutdown rather than a failure
    #[error("Interrupted")]
    Interrupted,

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a not-found error for the given path
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file and line context
    pub fn parse(
        message: impl Into<String>,
        file: impl Into<Option<PathBuf>>,
        line: usize,
    ) -> Self {
        Self::Parse { file: file.into(), line, message: message.into() }
    }

    /// Process exit code for this error.
    ///
    /// Input problems exit with 2, player problems with 3, and a user
    /// interrupt is a clean exit.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 0,
            Self::FileNotFound { .. } | Self::Parse { .. } | Self::Io { .. } => 2,
            Self::PlayerLaunch { .. } | Self::PlayerExited { .. } => 3,
            Self::Config { .. } | Self::Msg(_) => 1,
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}
