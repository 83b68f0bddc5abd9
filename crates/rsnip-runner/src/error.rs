//! Error types for building and running snippets.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while building or running a program.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reading or writing the temporary files failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A process could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The compiler rejected the program. Its diagnostics have already
    /// been written to the caller's stderr.
    #[error("build failed ({status})")]
    Build { status: ExitStatus },

    /// The program built but exited unsuccessfully.
    #[error("{status}")]
    Runtime { status: ExitStatus },

    /// The run was cancelled and the running process killed.
    #[error("cancelled")]
    Cancelled,
}

impl RunError {
    /// Exit code of the failed process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunError::Build { status } | RunError::Runtime { status } => status.code(),
            _ => None,
        }
    }

    pub fn is_build_failure(&self) -> bool {
        matches!(self, RunError::Build { .. })
    }
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunError>;
