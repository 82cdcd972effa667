use std::{sync::Arc, time::Duration};

use tokio::time;
use tracing::{debug, instrument};

use super::{
    error::PlayerctlError,
    launcher::{FollowProcess, ProcessLauncher},
    selector::PlayerFilter,
};

/// Default upper bound for a single one-shot invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

const FOLLOW_FLAG: &str = "--follow";

/// Invokes playerctl once per call with the current player filter prepended.
///
/// No retries happen here; callers decide whether a failure is worth
/// repeating.
#[derive(Clone)]
pub struct CommandRunner {
    launcher: Arc<dyn ProcessLauncher>,
    filter: PlayerFilter,
    timeout: Duration,
}

impl CommandRunner {
    /// Create a runner around `launcher`, sharing `filter`.
    pub fn new(launcher: Arc<dyn ProcessLauncher>, filter: PlayerFilter, timeout: Duration) -> Self {
        Self {
            launcher,
            filter,
            timeout,
        }
    }

    /// Filter argument shared with this runner.
    pub fn filter(&self) -> &PlayerFilter {
        &self.filter
    }

    /// Timeout applied to one-shot invocations.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run playerctl with `args` and return its trimmed stdout.
    ///
    /// # Errors
    /// - `BinaryNotFound` if playerctl is missing
    /// - `ExecutionError` on any other non-zero exit
    /// - `CommandTimedOut` if the process outlives the timeout
    /// - `SpawnFailed` if the process could not be started
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<String, PlayerctlError> {
        let argv = self.with_filter(args);
        debug!(?argv, "Running playerctl");

        let output = match time::timeout(self.timeout, self.launcher.output(argv)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(PlayerctlError::from_spawn(e)),
            Err(_) => {
                return Err(PlayerctlError::CommandTimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if !output.success() {
            return Err(PlayerctlError::from_exit(output.code, &output.stderr));
        }

        Ok(output.stdout.trim().to_string())
    }

    /// Check whether playerctl is installed.
    ///
    /// Runs `playerctl --version` without the player filter.
    ///
    /// # Errors
    /// Returns the failure when playerctl exists but could not report its
    /// version.
    #[instrument(skip(self))]
    pub async fn probe(&self) -> Result<bool, PlayerctlError> {
        let args = vec!["--version".to_string()];

        let output = match time::timeout(self.timeout, self.launcher.output(args)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return match PlayerctlError::from_spawn(e) {
                    PlayerctlError::BinaryNotFound => Ok(false),
                    other => Err(other),
                };
            }
            Err(_) => {
                return Err(PlayerctlError::CommandTimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if output.success() {
            debug!(version = output.stdout.trim(), "Found playerctl");
            return Ok(true);
        }

        match PlayerctlError::from_exit(output.code, &output.stderr) {
            PlayerctlError::BinaryNotFound => Ok(false),
            other => Err(other),
        }
    }

    /// Start a `--follow` invocation of `args`.
    ///
    /// # Errors
    /// Returns `BinaryNotFound` or `SpawnFailed` if the process could not start.
    pub fn follow<S: AsRef<str>>(&self, args: &[S]) -> Result<FollowProcess, PlayerctlError> {
        let mut argv = vec![self.filter.current(), FOLLOW_FLAG.to_string()];
        argv.extend(args.iter().map(|arg| arg.as_ref().to_string()));
        debug!(?argv, "Spawning playerctl follower");

        self.launcher
            .spawn_lines(argv)
            .map_err(PlayerctlError::from_spawn)
    }

    fn with_filter<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.filter.current());
        argv.extend(args.iter().map(|arg| arg.as_ref().to_string()));
        argv
    }
}
