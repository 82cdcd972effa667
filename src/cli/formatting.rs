//! Human-readable output for the command line.

use crate::services::playerctl::{LoopStatus, MediaEvent, NowPlayingStore, PlaybackStatus};

/// ANSI escape codes used for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";
    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats secondary information with muted styling
pub fn format_dim(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// `m:ss`, or `h:mm:ss` for an hour or more.
pub fn format_duration(milli: i64) -> String {
    let total = milli.max(0) / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn status_symbol(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "▶",
        PlaybackStatus::Paused => "⏸",
        PlaybackStatus::Stopped => "■",
        PlaybackStatus::Unknown => "?",
    }
}

fn loop_label(status: LoopStatus) -> &'static str {
    match status {
        LoopStatus::None => "off",
        LoopStatus::Track => "track",
        LoopStatus::Playlist => "playlist",
    }
}

/// One-line summary of `event` against the store it was applied to.
pub fn format_event(event: &MediaEvent, store: &NowPlayingStore, position_milli: i64) -> String {
    match event {
        MediaEvent::PlaybackInfoChanged(info) => {
            let track = &info.track_info;
            let progress = format_dim(&format!(
                "{} / {}",
                format_duration(position_milli),
                format_duration(i64::try_from(track.length_milli).unwrap_or(i64::MAX))
            ));

            if store.track_changed() {
                format!(
                    "{}{}{} {} {} {}",
                    Colors::BOLD,
                    status_symbol(info.playback_status),
                    Colors::RESET,
                    track.title,
                    format_dim(&format!("{} · {}", track.artist, track.album)),
                    progress,
                )
            } else {
                format!("{} {}", status_symbol(info.playback_status), progress)
            }
        }
        MediaEvent::PlaybackStatusChanged { status, .. } => format!(
            "{} {}",
            status_symbol(*status),
            format_dim(&format_duration(position_milli))
        ),
        MediaEvent::PositionChanged(_) => format_dim(&format!("at {}", format_duration(position_milli))),
        MediaEvent::ShuffleChanged(shuffle) => {
            format!("shuffle {}", if *shuffle { "on" } else { "off" })
        }
        MediaEvent::LoopStatusChanged(status) => format!("loop {}", loop_label(*status)),
        MediaEvent::VolumeChanged(_) => format!(
            "{}volume {:.0}%{}",
            Colors::CYAN,
            store.volume(),
            Colors::RESET
        ),
        MediaEvent::PlayerctlNotFound => format_error("playerctl is not installed"),
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::services::playerctl::{PlaybackInfo, PreviousPolicy, SeekFlag, TrackInfo};

    fn snapshot() -> MediaEvent {
        MediaEvent::PlaybackInfoChanged(PlaybackInfo {
            track_info: TrackInfo {
                title: "Pyramid Song".to_string(),
                artist: "Radiohead".to_string(),
                album: "Amnesiac".to_string(),
                url: String::new(),
                length_milli: 289_000,
                cover: String::new(),
                track_id: "/org/mpris/pyramid".to_string(),
            },
            shuffle: false,
            loop_status: LoopStatus::None,
            playback_status: PlaybackStatus::Playing,
            volume: 0.8,
            position_milli: 0,
        })
    }

    #[test]
    fn repeated_snapshot_omits_the_title() {
        let mut store = NowPlayingStore::new(SeekFlag::new(), PreviousPolicy::default());
        let event = snapshot();

        store.apply(&event, Instant::now());
        assert!(format_event(&event, &store, 0).contains("Pyramid Song"));

        store.apply(&event, Instant::now());
        let line = format_event(&event, &store, 61_000);
        assert!(!line.contains("Pyramid Song"));
        assert!(line.contains("1:01 / 4:49"));
    }

    #[test]
    fn durations_are_clock_style() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65_900), "1:05");
        assert_eq!(format_duration(3_725_000), "1:02:05");
        assert_eq!(format_duration(-5), "0:00");
    }
}
