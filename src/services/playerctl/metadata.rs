use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::TrackInfo;

/// Format template handed to `playerctl metadata --format`.
///
/// One `key:value` pair per line; `player` must stay last because the
/// follow stream uses it to detect the end of a block.
pub const METADATA_FORMAT: &str = "title:{{xesam:title}}\nartist:{{xesam:artist}}\nalbum:{{xesam:album}}\nurl:{{xesam:url}}\nlength:{{mpris:length}}\nartUrl:{{mpris:artUrl}}\ntrackid:{{mpris:trackid}}\nplayer:{{playerName}}";

const BLOCK_TERMINATOR: &str = "player";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Media players with known behavior.
///
/// Only used to pick quirk handling; anything unrecognized is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPlayer {
    /// Strawberry music player
    Strawberry,

    /// Amarok
    Amarok,

    /// Elisa
    Elisa,

    /// Any player without dedicated handling
    #[default]
    Unknown,
}

impl MediaPlayer {
    /// Every recognized player, excluding `Unknown`.
    pub const KNOWN: [MediaPlayer; 3] = [
        MediaPlayer::Strawberry,
        MediaPlayer::Amarok,
        MediaPlayer::Elisa,
    ];

    /// Playerctl name of this player.
    pub fn name(self) -> &'static str {
        match self {
            MediaPlayer::Strawberry => "strawberry",
            MediaPlayer::Amarok => "amarok",
            MediaPlayer::Elisa => "elisa",
            MediaPlayer::Unknown => "unknown",
        }
    }

    /// Resolve a free-text player name, ignoring case.
    pub fn resolve(name: &str) -> Self {
        let name = name.trim();
        Self::KNOWN
            .into_iter()
            .find(|player| player.name().eq_ignore_ascii_case(name))
            .unwrap_or(MediaPlayer::Unknown)
    }
}

impl FromStr for MediaPlayer {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::resolve(name))
    }
}

impl fmt::Display for MediaPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw metadata block reported by playerctl.
///
/// Optional fields are `None` when the player left them blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerctlMetadata {
    /// Track title
    pub title: Option<String>,

    /// Track artist(s)
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Track location
    pub url: Option<String>,

    /// Track length in milliseconds
    pub length: Option<f64>,

    /// Cover art location
    pub art_url: Option<String>,

    /// Player supplied track identifier
    pub track_id: Option<String>,

    /// Player that produced the block
    pub player: MediaPlayer,

    /// Keys outside the known template, kept verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PlayerctlMetadata {
    /// Parse a block of `key:value` lines.
    ///
    /// Each line is split at its first colon. Lines without a colon are
    /// dropped. `length` is converted from microseconds to milliseconds.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut metadata = Self::default();

        for line in lines {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            let Some((key, value)) = line.split_once(':') else {
                if !line.trim().is_empty() {
                    debug!(line, "Ignoring metadata line without a key");
                }
                continue;
            };

            metadata.apply(key.trim(), value);
        }

        metadata
    }

    fn apply(&mut self, key: &str, value: &str) {
        let present = (!value.trim().is_empty()).then(|| value.to_string());

        match key {
            "title" => self.title = present,
            "artist" => self.artist = present,
            "album" => self.album = present,
            "url" => self.url = present,
            "artUrl" => self.art_url = present,
            "trackid" => self.track_id = present,
            "length" => self.length = parse_length_micros(value),
            "player" => self.player = MediaPlayer::resolve(value),
            other => {
                self.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    /// Build the consumer facing track, substituting display defaults.
    pub fn to_track_info(&self, cover: String) -> TrackInfo {
        TrackInfo {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: self
                .artist
                .clone()
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: self
                .album
                .clone()
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            url: self.url.clone().unwrap_or_default(),
            length_milli: self.length.map(length_milli).unwrap_or_default(),
            cover,
            track_id: self.track_id.clone().unwrap_or_default(),
        }
    }
}

fn parse_length_micros(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Ok(micros) = value.parse::<i64>() {
        return Some(micros as f64 / 1000.0);
    }
    match value.parse::<f64>() {
        Ok(micros) if micros.is_finite() => Some(micros / 1000.0),
        _ => {
            if !value.is_empty() {
                debug!(value, "Discarding non-numeric track length");
            }
            None
        }
    }
}

fn length_milli(length: f64) -> u64 {
    if length.is_sign_negative() {
        0
    } else {
        length.trunc() as u64
    }
}

/// Collects follow-stream lines into complete metadata blocks.
///
/// Playerctl prints one line per template key; a block is complete once
/// its `player` line arrives.
#[derive(Debug, Default)]
pub struct MetadataBlockBuffer {
    lines: Vec<String>,
}

impl MetadataBlockBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns the parsed block when the line completes it.
    pub fn push(&mut self, line: &str) -> Option<PlayerctlMetadata> {
        let is_terminator = line
            .split_once(':')
            .is_some_and(|(key, _)| key.trim() == BLOCK_TERMINATOR);

        self.lines.push(line.to_string());

        if !is_terminator {
            return None;
        }

        let block = std::mem::take(&mut self.lines);
        Some(PlayerctlMetadata::parse(block))
    }
}
