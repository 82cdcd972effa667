//! Unit tests for the config module.

#![allow(clippy::panic)]

use std::{fs, time::Duration};

use crate::config::{
    Config, ConfigError, LogFormat, LogLevel, MediaPlayerSetting, default_players,
    players::{case_collisions, duplicate_priorities},
};

#[test]
fn default_players_are_ordered() {
    let players = default_players();

    assert_eq!(players.len(), 3);
    assert_eq!(players["elisa"].priority, 0);
    assert_eq!(players["strawberry"].priority, 1);
    assert_eq!(players["amarok"].priority, 2);
    assert!(players.values().all(|p| p.enabled));
}

#[test]
fn empty_toml_is_default() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.playerctl.binary, "playerctl");
    assert_eq!(config.playerctl.command_timeout(), Duration::from_secs(5));
    assert_eq!(config.playerctl.seek_debounce(), Duration::from_millis(250));
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [general]
        log_level = "debug"

        [playerctl]
        seek_debounce_ms = 100
        previous_restarts_track = false
        "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.general.log_format, LogFormat::Pretty);
    assert_eq!(config.playerctl.seek_debounce_ms, 100);
    assert_eq!(config.playerctl.command_timeout_ms, 5_000);
    assert!(!config.playerctl.previous_policy().restarts_track);
    assert_eq!(config.players, default_players());
}

#[test]
fn explicit_players_replace_defaults() {
    let config = Config::from_toml_str(
        r#"
        [players.vlc]
        priority = 1

        [players.elisa]
        enabled = false
        "#,
    )
    .unwrap();

    assert_eq!(config.players.len(), 2);
    assert_eq!(
        config.players["vlc"],
        MediaPlayerSetting {
            enabled: true,
            priority: 1
        }
    );
    assert!(!config.players["elisa"].enabled);
    assert_eq!(config.players["elisa"].priority, 0);
}

#[test]
fn negative_priority_is_rejected() {
    let err = Config::from_toml_str(
        r#"
        [players.vlc]
        priority = -1
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::TomlParse { .. }));
}

#[test]
fn unknown_log_level_is_rejected() {
    let err = Config::from_toml_str(
        r#"
        [general]
        log_level = "loud"
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::TomlParse { location, .. } if location == "string"));
}

#[test]
fn duplicate_priorities_ignore_disabled_players() {
    let config = Config::from_toml_str(
        r#"
        [players.vlc]
        priority = 0

        [players.elisa]
        priority = 0

        [players.mpv]
        enabled = false
        priority = 1

        [players.spotify]
        priority = 1
        "#,
    )
    .unwrap();

    assert_eq!(
        duplicate_priorities(&config.players),
        vec![(0, vec!["elisa".to_string(), "vlc".to_string()])]
    );
}

#[test]
fn case_collisions_are_detected() {
    let config = Config::from_toml_str(
        r#"
        [players.Elisa]
        priority = 0

        [players.elisa]
        priority = 1
        "#,
    )
    .unwrap();

    assert_eq!(
        case_collisions(&config.players),
        vec![vec!["Elisa".to_string(), "elisa".to_string()]]
    );
}

#[test]
fn serialized_defaults_parse_back() {
    let original = Config::default();
    let toml_str = original.to_toml_string().unwrap();

    assert!(toml_str.contains("[playerctl]"));
    assert_eq!(Config::from_toml_str(&toml_str).unwrap(), original);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("config.toml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn load_reports_file_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[playerctl\nbinary = ").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(
        matches!(&err, ConfigError::TomlParse { location, .. } if location.ends_with("config.toml")),
        "{err}"
    );
}

#[test]
fn default_file_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    assert!(Config::create_default_file(&path).unwrap());
    assert!(!Config::create_default_file(&path).unwrap());
    assert_eq!(Config::load(&path).unwrap(), Config::default());
}

#[test]
fn schema_describes_sections() {
    let schema = serde_json::to_value(schemars::schema_for!(Config)).unwrap();
    let properties = &schema["properties"];

    assert!(properties.get("general").is_some());
    assert!(properties.get("playerctl").is_some());
    assert!(properties.get("players").is_some());
}
