use std::{env, fs, path::PathBuf};

use super::ConfigError;

const APP_NAME: &str = "nowplaying";

/// Locations of configuration and data files.
///
/// Follows the XDG base directory layout.
pub struct ConfigPaths;

impl ConfigPaths {
    /// Configuration directory.
    ///
    /// `$XDG_CONFIG_HOME/nowplaying`, falling back to `$HOME/.config/nowplaying`.
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is set
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .or_else(|| env::var("HOME").ok().map(|home| format!("{home}/.config")))
            .ok_or(ConfigError::NoConfigDir(
                "neither XDG_CONFIG_HOME nor HOME is set",
            ))?;

        Ok(PathBuf::from(config_home).join(APP_NAME))
    }

    /// Path of the main configuration file.
    ///
    /// # Errors
    /// Returns an error if the configuration directory cannot be located
    pub fn main_config() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Application data directory, created if missing.
    ///
    /// `$XDG_DATA_HOME/nowplaying`, falling back to `$HOME/.local/share/nowplaying`.
    ///
    /// # Errors
    /// Returns an error if no base directory is set or it cannot be created
    pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
        let data_home = env::var("XDG_DATA_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .or_else(|| env::var("HOME").ok().map(|home| format!("{home}/.local/share")))
            .ok_or(ConfigError::NoConfigDir(
                "neither XDG_DATA_HOME nor HOME is set",
            ))?;

        let app_dir = PathBuf::from(data_home).join(APP_NAME);
        fs::create_dir_all(&app_dir).map_err(|e| ConfigError::io(e, &app_dir))?;

        Ok(app_dir)
    }

    /// Log directory, created if missing.
    ///
    /// # Errors
    /// Returns error if directory cannot be created
    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        let log_dir = Self::app_data_dir()?.join("logs");
        fs::create_dir_all(&log_dir).map_err(|e| ConfigError::io(e, &log_dir))?;

        Ok(log_dir)
    }
}
