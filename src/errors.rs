//! Typed errors for alias expansion and command execution.
//!
//! Failures of the external tools themselves are not errors here: a tool that
//! runs and exits non-zero is reported as an [`ExitOutcome`](crate::runner::ExitOutcome)
//! and its exit code is handed back to the caller's shell untouched.

use thiserror::Error;

/// Exit code used when a program cannot be found, matching `sh`.
pub const EXIT_NOT_FOUND: u8 = 127;

/// Exit code used for usage errors, matching `make`.
pub const EXIT_USAGE: u8 = 2;

/// Errors raised before or while launching an external command.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Migration name is required: use `botctl migration name=<text>`")]
    MissingMigrationName,

    #[error("The configured {what} command is empty")]
    EmptyCommand { what: &'static str },

    #[error("{program}: command not found")]
    ToolNotFound { program: String },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    /// Classify a spawn failure. A missing binary gets its own variant so the
    /// caller can report it the way a shell would.
    pub fn from_spawn(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            TaskError::ToolNotFound {
                program: program.to_string(),
            }
        } else {
            TaskError::Spawn {
                program: program.to_string(),
                source,
            }
        }
    }

    /// Process exit code `botctl` should terminate with for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TaskError::ToolNotFound { .. } => EXIT_NOT_FOUND,
            TaskError::MissingMigrationName | TaskError::EmptyCommand { .. } => EXIT_USAGE,
            TaskError::Spawn { .. } | TaskError::Wait { .. } => 1,
        }
    }
}
