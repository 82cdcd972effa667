use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selection settings of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaPlayerSetting {
    /// Whether the player is listened to.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Lower values are preferred when several players are active.
    #[serde(default)]
    pub priority: u32,
}

/// Player settings keyed by player name.
pub type MediaPlayerSettings = BTreeMap<String, MediaPlayerSetting>;

fn enabled_by_default() -> bool {
    true
}

/// The players known to work, in preference order.
pub fn default_players() -> MediaPlayerSettings {
    ["elisa", "strawberry", "amarok"]
        .into_iter()
        .zip(0..)
        .map(|(name, priority)| {
            (
                name.to_string(),
                MediaPlayerSetting {
                    enabled: true,
                    priority,
                },
            )
        })
        .collect()
}

/// Priorities shared by more than one enabled player, with the players
/// sharing them.
pub(super) fn duplicate_priorities(settings: &MediaPlayerSettings) -> Vec<(u32, Vec<String>)> {
    let mut by_priority: HashMap<u32, Vec<String>> = HashMap::new();
    for (name, setting) in settings.iter().filter(|(_, s)| s.enabled) {
        by_priority
            .entry(setting.priority)
            .or_default()
            .push(name.clone());
    }

    let mut duplicates: Vec<(u32, Vec<String>)> = by_priority
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .collect();
    duplicates.sort_by_key(|(priority, _)| *priority);
    duplicates
}

/// Names that only differ by case.
pub(super) fn case_collisions(settings: &MediaPlayerSettings) -> Vec<Vec<String>> {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in settings.keys() {
        by_name
            .entry(name.to_lowercase())
            .or_default()
            .push(name.clone());
    }

    by_name
        .into_values()
        .filter(|names| names.len() > 1)
        .collect()
}
