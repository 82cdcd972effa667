use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Track details pushed to the consumer.
///
/// Replaced wholesale on every metadata refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Track title
    pub title: String,

    /// Track artist(s)
    pub artist: String,

    /// Album name
    pub album: String,

    /// Location of the track, possibly URI encoded with a scheme prefix
    pub url: String,

    /// Track length in milliseconds
    pub length_milli: u64,

    /// Either a remote URL or an embedded `data:` image
    pub cover: String,

    /// Player supplied track identifier, empty when the player has none
    pub track_id: String,
}

impl TrackInfo {
    /// Whether `other` describes the same track.
    ///
    /// Compares track ids when both sides carry one, otherwise falls back
    /// to the title.
    pub fn same_track(&self, other: &TrackInfo) -> bool {
        if !self.track_id.is_empty() && !other.track_id.is_empty() {
            return self.track_id == other.track_id;
        }
        self.title == other.title
    }
}

/// Complete playback state of the active player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackInfo {
    /// Current track
    pub track_info: TrackInfo,

    /// Whether shuffle is enabled
    pub shuffle: bool,

    /// Current loop mode
    pub loop_status: LoopStatus,

    /// Current playback status
    pub playback_status: PlaybackStatus,

    /// Volume in the 0.0 - 1.0 range
    pub volume: f64,

    /// Playback position in milliseconds
    pub position_milli: i64,
}

/// Loop mode for track or playlist repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopStatus {
    /// No looping
    #[default]
    None,

    /// Loop current track
    Track,

    /// Loop entire playlist
    Playlist,
}

impl LoopStatus {
    /// Playerctl spelling of this loop status.
    pub fn as_str(self) -> &'static str {
        match self {
            LoopStatus::None => "None",
            LoopStatus::Track => "Track",
            LoopStatus::Playlist => "Playlist",
        }
    }

    /// Parse a loop status, rejecting anything outside the three known values.
    ///
    /// Playerctl emits an empty line on the loop stream when a player closes,
    /// which must not be mistaken for a new state.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "None" => Some(LoopStatus::None),
            "Track" => Some(LoopStatus::Track),
            "Playlist" => Some(LoopStatus::Playlist),
            _ => None,
        }
    }
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current playback state of a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    Stopped,

    /// Status could not be determined
    #[default]
    Unknown,
}

impl From<&str> for PlaybackStatus {
    fn from(status: &str) -> Self {
        match status.trim() {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            "Stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Unknown => "Unknown",
        };
        f.write_str(status)
    }
}

/// Argument accepted by `shuffle` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuffleArg {
    /// Enable shuffle
    On,

    /// Disable shuffle
    Off,

    /// Flip the current shuffle state
    Toggle,
}

impl ShuffleArg {
    /// Playerctl spelling of this argument.
    pub fn as_str(self) -> &'static str {
        match self {
            ShuffleArg::On => "On",
            ShuffleArg::Off => "Off",
            ShuffleArg::Toggle => "Toggle",
        }
    }
}

impl FromStr for ShuffleArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(ShuffleArg::On),
            "off" | "false" => Ok(ShuffleArg::Off),
            "toggle" => Ok(ShuffleArg::Toggle),
            other => Err(format!("expected On, Off or Toggle, got '{other}'")),
        }
    }
}

impl fmt::Display for ShuffleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(LoopStatus::None),
            "track" => Ok(LoopStatus::Track),
            "playlist" => Ok(LoopStatus::Playlist),
            other => Err(format!("expected None, Track or Playlist, got '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, track_id: &str) -> TrackInfo {
        TrackInfo {
            title: title.to_string(),
            artist: String::new(),
            album: String::new(),
            url: String::new(),
            length_milli: 0,
            cover: String::new(),
            track_id: track_id.to_string(),
        }
    }

    #[test]
    fn loop_status_rejects_unknown_values() {
        assert_eq!(LoopStatus::parse("Track"), Some(LoopStatus::Track));
        assert_eq!(LoopStatus::parse(""), None);
        assert_eq!(LoopStatus::parse("track"), None);
        assert_eq!(LoopStatus::parse("Shuffle"), None);
    }

    #[test]
    fn playback_status_falls_back_to_unknown() {
        assert_eq!(PlaybackStatus::from("Playing\n"), PlaybackStatus::Playing);
        assert_eq!(PlaybackStatus::from("Paused"), PlaybackStatus::Paused);
        assert_eq!(PlaybackStatus::from("No players found"), PlaybackStatus::Unknown);
    }

    #[test]
    fn shuffle_arg_parses_case_insensitively() {
        assert_eq!("toggle".parse::<ShuffleArg>(), Ok(ShuffleArg::Toggle));
        assert_eq!("ON".parse::<ShuffleArg>(), Ok(ShuffleArg::On));
        assert!("sideways".parse::<ShuffleArg>().is_err());
    }

    #[test]
    fn same_track_prefers_track_id() {
        assert!(track("A", "/id/1").same_track(&track("B", "/id/1")));
        assert!(!track("A", "/id/1").same_track(&track("A", "/id/2")));
        assert!(track("A", "").same_track(&track("A", "/id/2")));
    }

    #[test]
    fn playback_info_serializes_camel_case() {
        let info = PlaybackInfo {
            track_info: track("Foo", ""),
            shuffle: true,
            loop_status: LoopStatus::Playlist,
            playback_status: PlaybackStatus::Playing,
            volume: 0.5,
            position_milli: 1200,
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["trackInfo"]["lengthMilli"], 0);
        assert_eq!(json["loopStatus"], "Playlist");
        assert_eq!(json["playbackStatus"], "Playing");
        assert_eq!(json["positionMilli"], 1200);
    }
}
