use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::playerctl::{
    runner::DEFAULT_COMMAND_TIMEOUT, seek::DEFAULT_SEEK_DEBOUNCE, store::PreviousPolicy,
};

/// How the playerctl binary is driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlayerctlConfig {
    /// Name or path of the playerctl executable.
    pub binary: String,

    /// Upper bound for a single one-shot invocation, in milliseconds.
    pub command_timeout_ms: u64,

    /// Window in which seek requests are merged, in milliseconds.
    pub seek_debounce_ms: u64,

    /// Whether "previous" restarts the current track when far enough in.
    pub previous_restarts_track: bool,

    /// Position after which "previous" restarts the track, in milliseconds.
    pub previous_restart_threshold_ms: u64,
}

impl Default for PlayerctlConfig {
    fn default() -> Self {
        Self {
            binary: "playerctl".to_string(),
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
            seek_debounce_ms: DEFAULT_SEEK_DEBOUNCE.as_millis() as u64,
            previous_restarts_track: true,
            previous_restart_threshold_ms: 3_000,
        }
    }
}

impl PlayerctlConfig {
    /// One-shot command timeout.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Seek debounce window.
    pub fn seek_debounce(&self) -> Duration {
        Duration::from_millis(self.seek_debounce_ms)
    }

    /// Behavior of the "previous" action.
    pub fn previous_policy(&self) -> PreviousPolicy {
        PreviousPolicy {
            restarts_track: self.previous_restarts_track,
            threshold: Duration::from_millis(self.previous_restart_threshold_ms),
        }
    }
}
