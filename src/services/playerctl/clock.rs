use tokio::time::Instant;

use super::{seek::SeekFlag, types::PlaybackStatus};

/// Extrapolates playback position between sparse position updates.
///
/// Position is only pushed on seeks, track changes and explicit queries.
/// While playing, the displayed value is the last authoritative position plus
/// the time elapsed since it was recorded.
#[derive(Debug, Clone)]
pub struct PositionClock {
    last_known_milli: i64,
    anchor: Instant,
    status: PlaybackStatus,
    length_milli: Option<u64>,
    seek: SeekFlag,
}

impl PositionClock {
    /// Stopped clock at position zero, observing `seek` for in-flight seeks.
    pub fn new(seek: SeekFlag) -> Self {
        Self {
            last_known_milli: 0,
            anchor: Instant::now(),
            status: PlaybackStatus::Stopped,
            length_milli: None,
            seek,
        }
    }

    /// Record an authoritative position observed at `observed_at`.
    ///
    /// Resets the extrapolation anchor.
    pub fn record_position(&mut self, position_milli: i64, observed_at: Instant) {
        self.last_known_milli = position_milli.max(0);
        self.anchor = observed_at;
    }

    /// Update the playback status.
    ///
    /// Entering `Playing` re-anchors at `at` so time spent paused is not
    /// counted.
    pub fn set_playback_status(&mut self, status: PlaybackStatus, at: Instant) {
        if status == PlaybackStatus::Playing && self.status != PlaybackStatus::Playing {
            self.anchor = at;
        }
        self.status = status;
    }

    /// Set the track length used to clamp extrapolation. Zero means unknown.
    pub fn set_length(&mut self, length_milli: u64) {
        self.length_milli = (length_milli > 0).then_some(length_milli);
    }

    /// Current playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Last authoritative position.
    pub fn last_known(&self) -> i64 {
        self.last_known_milli
    }

    /// Displayed position at `now`.
    pub fn position_at(&self, now: Instant) -> i64 {
        if self.status != PlaybackStatus::Playing || self.seek.is_set() {
            return self.last_known_milli;
        }

        let elapsed = now.saturating_duration_since(self.anchor).as_millis();
        let position = self
            .last_known_milli
            .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX));

        match self.length_milli {
            Some(length) => position.min(i64::try_from(length).unwrap_or(i64::MAX)),
            None => position,
        }
    }
}
