use std::{io, time::Duration};

/// Exit code a shell reports when the requested binary does not exist.
pub const EXIT_CODE_NOT_FOUND: i32 = 127;

/// Errors that can occur while talking to playerctl
#[derive(thiserror::Error, Debug)]
pub enum PlayerctlError {
    /// The control binary is not installed or not on `PATH`
    #[error("playerctl binary not found")]
    BinaryNotFound,

    /// The binary ran but exited unsuccessfully
    #[error("playerctl exited with {code:?}: {stderr}")]
    ExecutionError {
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The binary did not finish within the configured timeout
    #[error("playerctl did not finish within {timeout:?}")]
    CommandTimedOut {
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// The process could not be spawned for a reason other than absence
    #[error("failed to spawn playerctl: {0}")]
    SpawnFailed(#[source] io::Error),

    /// A dispatch was requested for a command that does not exist
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A command received arguments it cannot use
    #[error("invalid argument for {command}: {reason}")]
    InvalidArgument {
        /// Command that rejected the argument
        command: String,
        /// Why the argument was rejected
        reason: String,
    },

    /// Playerctl answered with output that could not be interpreted
    #[error("unexpected output from {command}: {output:?}")]
    InvalidOutput {
        /// Command whose output was rejected
        command: String,
        /// The raw output
        output: String,
    },
}

impl PlayerctlError {
    /// Classify a spawn failure, mapping a missing executable to `BinaryNotFound`.
    pub fn from_spawn(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            PlayerctlError::BinaryNotFound
        } else {
            PlayerctlError::SpawnFailed(error)
        }
    }

    /// Classify a non-zero exit.
    pub fn from_exit(code: Option<i32>, stderr: &str) -> Self {
        if code == Some(EXIT_CODE_NOT_FOUND) {
            PlayerctlError::BinaryNotFound
        } else {
            PlayerctlError::ExecutionError {
                code,
                stderr: stderr.trim().to_string(),
            }
        }
    }

    /// Whether this error means the control binary is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlayerctlError::BinaryNotFound)
    }
}
