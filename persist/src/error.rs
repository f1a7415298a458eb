//! Error types for planning, capturing and persisting generated SQL.
//!
//! [`ResolveError`] and [`WriteError`] are local to one item and are reported
//! through the [`Reporter`](crate::Reporter) without stopping the run.
//! [`PersistError`] is fatal and returned to the caller.

use std::path::PathBuf;

use pgdcp_core::ValidationError;
use thiserror::Error;

use crate::report::FailureCode;

/// Failure to produce the content of one item.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The program could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("'{program}' exited with {status}{}", stderr_suffix(.stderr))]
    NonZeroExit {
        program: String,
        /// Exit code, or a signal description when no code is available.
        status: String,
        stderr: String,
    },

    /// The program did not finish within the capture timeout.
    #[error("'{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    /// Waiting on the program or reading its output failed.
    #[error("failed to capture output of '{program}': {detail}")]
    Capture { program: String, detail: String },

    /// The entry was rejected while planning and never ran.
    #[error("invalid entry: {0}")]
    InvalidEntry(#[from] ValidationError),
}

impl ResolveError {
    pub fn failure_code(&self) -> FailureCode {
        match self {
            Self::Spawn { .. } => FailureCode::SpawnFailed,
            Self::NonZeroExit { .. } => FailureCode::NonZeroExit,
            Self::Timeout { .. } => FailureCode::Timeout,
            Self::Capture { .. } => FailureCode::CaptureFailed,
            Self::InvalidEntry(_) => FailureCode::InvalidEntry,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Failure to write one item to its destination.
#[derive(Debug, Error)]
#[error("failed to write '{}': {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The driver file could not be written.
    #[error("failed to write driver file: {0}")]
    Finalize(#[source] WriteError),

    /// File I/O failure outside of item processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`PersistError`].
pub type Result<T> = std::result::Result<T, PersistError>;
