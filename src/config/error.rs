use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while locating, reading or watching the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set
    #[error("cannot locate configuration directory: {0}")]
    NoConfigDir(&'static str),

    /// I/O failure on a configuration path
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// File path, or "string" for in-memory input
        location: String,
        /// Parser message
        details: String,
    },

    /// The configuration could not be rendered as TOML
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// File watcher failure
    #[error("failed to watch configuration: {0}")]
    Watch(#[from] notify::Error),
}

impl ConfigError {
    /// TOML parsing error, located at `path` when known.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(path) => path.display().to_string(),
            None => "string".to_string(),
        };

        ConfigError::TomlParse {
            location,
            details: error.to_string(),
        }
    }

    /// I/O error on `path`.
    pub fn io(source: io::Error, path: &Path) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
