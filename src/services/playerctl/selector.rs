use std::{
    cmp::Ordering,
    sync::{Arc, PoisonError, RwLock},
};

use crate::config::MediaPlayerSettings;

/// Filter argument that lets playerctl talk to every player.
///
/// An empty argument list makes playerctl reject the command, while an
/// empty `--player=` selects all players.
pub const ALL_PLAYERS_ARG: &str = "--player=";

/// Compute the `--player=` allow-list for the given settings.
///
/// Enabled players are ordered by ascending priority, ties broken by
/// case-insensitive name. When no player is enabled the `previous`
/// argument is returned unchanged so the supervisor never ends up
/// listening to nothing.
pub fn compute_filter_arg(settings: &MediaPlayerSettings, previous: &str) -> String {
    let mut enabled: Vec<(&String, u32)> = settings
        .iter()
        .filter(|(_, setting)| setting.enabled)
        .map(|(name, setting)| (name, setting.priority))
        .collect();

    if enabled.is_empty() {
        return previous.to_string();
    }

    enabled.sort_by(|(name_a, priority_a), (name_b, priority_b)| {
        priority_a
            .cmp(priority_b)
            .then_with(|| compare_names(name_a, name_b))
    });

    let names: Vec<&str> = enabled.iter().map(|(name, _)| name.as_str()).collect();
    format!("{ALL_PLAYERS_ARG}{}", names.join(","))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Shared, current player filter argument.
///
/// Cloned into every component that invokes playerctl so one-shot
/// commands and follow streams always agree on the selected players.
#[derive(Debug, Clone)]
pub struct PlayerFilter {
    arg: Arc<RwLock<String>>,
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self {
            arg: Arc::new(RwLock::new(ALL_PLAYERS_ARG.to_string())),
        }
    }
}

impl PlayerFilter {
    /// Create a filter that selects every player.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current argument value.
    pub fn current(&self) -> String {
        self.arg
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Argument the given settings would produce, without storing it.
    pub fn preview(&self, settings: &MediaPlayerSettings) -> String {
        compute_filter_arg(settings, &self.current())
    }

    /// Recompute from `settings`; returns whether the argument changed.
    pub fn update(&self, settings: &MediaPlayerSettings) -> bool {
        let mut arg = self.arg.write().unwrap_or_else(PoisonError::into_inner);
        let next = compute_filter_arg(settings, &arg);
        if next == *arg {
            return false;
        }
        *arg = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaPlayerSetting;

    fn settings(entries: &[(&str, bool, u32)]) -> MediaPlayerSettings {
        entries
            .iter()
            .map(|(name, enabled, priority)| {
                (
                    name.to_string(),
                    MediaPlayerSetting {
                        enabled: *enabled,
                        priority: *priority,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn orders_by_priority_then_name() {
        let settings = settings(&[
            ("vlc", true, 1),
            ("Elisa", true, 2),
            ("amarok", true, 2),
            ("strawberry", true, 0),
        ]);

        assert_eq!(
            compute_filter_arg(&settings, ALL_PLAYERS_ARG),
            "--player=strawberry,vlc,amarok,Elisa"
        );
    }

    #[test]
    fn disabled_players_are_skipped() {
        let settings = settings(&[("elisa", true, 3), ("vlc", false, 0)]);
        assert_eq!(
            compute_filter_arg(&settings, ALL_PLAYERS_ARG),
            "--player=elisa"
        );
    }

    #[test]
    fn empty_selection_keeps_previous_argument() {
        let previous = "--player=elisa";

        assert_eq!(compute_filter_arg(&settings(&[]), previous), previous);
        assert_eq!(
            compute_filter_arg(&settings(&[("vlc", false, 0)]), previous),
            previous
        );
        assert_eq!(
            compute_filter_arg(&settings(&[]), ALL_PLAYERS_ARG),
            ALL_PLAYERS_ARG
        );
    }

    #[test]
    fn update_reports_only_real_changes() {
        let filter = PlayerFilter::new();

        assert!(filter.update(&settings(&[("elisa", true, 0)])));
        assert_eq!(filter.current(), "--player=elisa");

        assert!(!filter.update(&settings(&[("elisa", true, 0), ("vlc", false, 1)])));
        assert!(!filter.update(&settings(&[])));
        assert_eq!(filter.current(), "--player=elisa");

        assert!(filter.update(&settings(&[("elisa", true, 0), ("vlc", true, 1)])));
        assert_eq!(filter.current(), "--player=elisa,vlc");
    }

    #[test]
    fn preview_does_not_store() {
        let filter = PlayerFilter::new();
        let preview = filter.preview(&settings(&[("amarok", true, 0)]));

        assert_eq!(preview, "--player=amarok");
        assert_eq!(filter.current(), ALL_PLAYERS_ARG);
    }
}
