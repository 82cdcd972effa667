use std::collections::HashMap;

use super::metadata::MediaPlayer;

/// How a bare status-change line should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHandling {
    /// Refetch the full metadata block and emit a complete snapshot
    RefetchMetadata,

    /// Only re-query the position and emit the status with it
    PositionFastPath,
}

/// Per-player behavior differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuirkProfile {
    /// Whether the conditional metadata-follow listener must run
    pub follow_metadata: bool,

    /// Interpretation of status-change events
    pub on_status: StatusHandling,
}

impl QuirkProfile {
    /// Behavior for players that emit standard MPRIS status changes.
    pub const STANDARD: QuirkProfile = QuirkProfile {
        follow_metadata: false,
        on_status: StatusHandling::RefetchMetadata,
    };
}

impl Default for QuirkProfile {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Quirk profiles keyed by player.
///
/// Players without an entry use [`QuirkProfile::STANDARD`].
#[derive(Debug, Clone)]
pub struct QuirkTable {
    profiles: HashMap<MediaPlayer, QuirkProfile>,
}

impl Default for QuirkTable {
    fn default() -> Self {
        let mut table = Self::empty();

        // Strawberry does not report a status change when the track changes,
        // so track changes are picked up from the metadata stream instead.
        table.insert(
            MediaPlayer::Strawberry,
            QuirkProfile {
                follow_metadata: true,
                on_status: StatusHandling::PositionFastPath,
            },
        );

        table
    }
}

impl QuirkTable {
    /// Table with no quirky players.
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Register or replace the profile of `player`.
    pub fn insert(&mut self, player: MediaPlayer, profile: QuirkProfile) {
        self.profiles.insert(player, profile);
    }

    /// Profile for `player`.
    pub fn profile(&self, player: MediaPlayer) -> QuirkProfile {
        self.profiles.get(&player).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strawberry_uses_fast_path_and_metadata_follow() {
        let table = QuirkTable::default();
        let profile = table.profile(MediaPlayer::Strawberry);

        assert!(profile.follow_metadata);
        assert_eq!(profile.on_status, StatusHandling::PositionFastPath);
    }

    #[test]
    fn other_players_are_standard() {
        let table = QuirkTable::default();

        for player in [MediaPlayer::Elisa, MediaPlayer::Amarok, MediaPlayer::Unknown] {
            assert_eq!(table.profile(player), QuirkProfile::STANDARD);
        }
    }

    #[test]
    fn entries_can_be_added() {
        let mut table = QuirkTable::empty();
        table.insert(
            MediaPlayer::Amarok,
            QuirkProfile {
                follow_metadata: true,
                on_status: StatusHandling::RefetchMetadata,
            },
        );

        assert!(table.profile(MediaPlayer::Amarok).follow_metadata);
        assert!(!table.profile(MediaPlayer::Strawberry).follow_metadata);
    }
}
