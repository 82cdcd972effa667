use std::{fs, io::ErrorKind, path::Path};

use tracing::{debug, warn};

use super::{
    Config, ConfigError,
    players::{case_collisions, duplicate_priorities},
};

impl Config {
    /// Load the configuration at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The TOML content is invalid
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(ConfigError::io(e, path)),
        };

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::toml_parse(e, Some(path)))?;
        config.warn_on_ambiguities();

        Ok(config)
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the TOML content is invalid
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::toml_parse(e, None))?;
        config.warn_on_ambiguities();

        Ok(config)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the defaults to `path` unless a file already exists.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created
    pub fn create_default_file(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(e, parent))?;
        }

        let content = format!(
            "# nowplaying configuration file\n\n{}",
            Config::default().to_toml_string()?
        );
        fs::write(path, content).map_err(|e| ConfigError::io(e, path))?;

        Ok(true)
    }

    /// Ties in player priority are resolved by name, which is rarely what was
    /// meant.
    fn warn_on_ambiguities(&self) {
        for (priority, players) in duplicate_priorities(&self.players) {
            warn!(
                priority,
                ?players,
                "Enabled players share a priority, ordering them by name"
            );
        }

        for names in case_collisions(&self.players) {
            warn!(?names, "Player names differ only by case");
        }
    }
}
