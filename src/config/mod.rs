//! Configuration schema definitions and loading.
//!
//! The configuration is a single TOML file. Every section has defaults, so a
//! missing or empty file is a valid configuration.

mod error;
mod general;
mod loading;
mod paths;
mod players;
mod playerctl;
mod watcher;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use general::{GeneralConfig, LogFormat, LogLevel};
pub use paths::ConfigPaths;
pub use players::{MediaPlayerSetting, MediaPlayerSettings, default_players};
pub use playerctl::PlayerctlConfig;
pub use watcher::{ConfigWatcher, FileEvent, FileEventKind};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// How the playerctl binary is driven.
    #[serde(default)]
    pub playerctl: PlayerctlConfig,

    /// Players to listen to, keyed by player name.
    #[serde(default = "default_players")]
    pub players: MediaPlayerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            playerctl: PlayerctlConfig::default(),
            players: default_players(),
        }
    }
}
