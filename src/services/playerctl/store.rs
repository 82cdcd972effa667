use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::{
    clock::PositionClock,
    events::MediaEvent,
    seek::SeekFlag,
    types::{LoopStatus, PlaybackStatus, TrackInfo},
};

/// How the "previous" button behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousPolicy {
    /// Restart the current track instead of skipping when far enough in
    pub restarts_track: bool,

    /// Position after which "previous" restarts the track
    pub threshold: Duration,
}

impl Default for PreviousPolicy {
    fn default() -> Self {
        Self {
            restarts_track: true,
            threshold: Duration::from_secs(3),
        }
    }
}

/// Outcome of pressing "previous".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousAction {
    /// Seek back to the start of the current track
    RestartTrack,

    /// Skip to the previous track
    PreviousTrack,
}

/// Local view of the now-playing state, built from supervisor events.
#[derive(Debug, Clone)]
pub struct NowPlayingStore {
    track: Option<TrackInfo>,
    track_changed: bool,
    volume: f64,
    shuffle: bool,
    loop_status: LoopStatus,
    clock: PositionClock,
    available: bool,
    dirty: bool,
    previous: PreviousPolicy,
}

impl NowPlayingStore {
    /// Empty store sharing `seek` with the seek controller.
    pub fn new(seek: SeekFlag, previous: PreviousPolicy) -> Self {
        Self {
            track: None,
            track_changed: false,
            volume: 0.0,
            shuffle: false,
            loop_status: LoopStatus::None,
            clock: PositionClock::new(seek),
            available: true,
            dirty: false,
            previous,
        }
    }

    /// Fold `event`, received at `at`, into the view.
    pub fn apply(&mut self, event: &MediaEvent, at: Instant) {
        match event {
            MediaEvent::PlaybackInfoChanged(info) => {
                self.clock.set_length(info.track_info.length_milli);
                self.clock.set_playback_status(info.playback_status, at);
                self.clock.record_position(info.position_milli, at);
                self.track_changed = self
                    .track
                    .as_ref()
                    .is_none_or(|track| !track.same_track(&info.track_info));
                if self.track_changed {
                    debug!(title = %info.track_info.title, "Track changed");
                }
                self.track = Some(info.track_info.clone());
                self.volume = info.volume * 100.0;
                self.shuffle = info.shuffle;
                self.loop_status = info.loop_status;
            }
            MediaEvent::PlaybackStatusChanged {
                status,
                position_milli,
            } => {
                self.clock.set_playback_status(*status, at);
                self.clock.record_position(*position_milli, at);
            }
            MediaEvent::PositionChanged(position_milli) => {
                self.clock.record_position(*position_milli, at);
            }
            MediaEvent::ShuffleChanged(shuffle) => self.shuffle = *shuffle,
            MediaEvent::LoopStatusChanged(status) => self.loop_status = *status,
            MediaEvent::VolumeChanged(volume) => self.volume = *volume,
            MediaEvent::PlayerctlNotFound => {
                debug!("Marking media backend unavailable");
                self.available = false;
            }
        }
        self.dirty = true;
    }

    /// Current track, if any has been reported.
    pub fn track(&self) -> Option<&TrackInfo> {
        self.track.as_ref()
    }

    /// Whether the latest snapshot carried a different track than the one
    /// before it.
    pub fn track_changed(&self) -> bool {
        self.track_changed
    }

    /// Volume in the 0 - 100 range.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Shuffle state.
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Loop state.
    pub fn loop_status(&self) -> LoopStatus {
        self.loop_status
    }

    /// Playback status.
    pub fn playback_status(&self) -> PlaybackStatus {
        self.clock.status()
    }

    /// Whether something is playing.
    pub fn is_playing(&self) -> bool {
        self.clock.status() == PlaybackStatus::Playing
    }

    /// False once the control binary was reported missing.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Displayed position at `now`.
    pub fn position_at(&self, now: Instant) -> i64 {
        self.clock.position_at(now)
    }

    /// Record a position the consumer moved to locally, such as a seek target.
    pub fn record_position(&mut self, position_milli: i64, at: Instant) {
        self.clock.record_position(position_milli, at);
        self.dirty = true;
    }

    /// Return whether anything changed since the last call, and reset.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Decide what "previous" should do at `now`.
    pub fn previous_action(&self, now: Instant) -> PreviousAction {
        let threshold = i64::try_from(self.previous.threshold.as_millis()).unwrap_or(i64::MAX);
        if self.previous.restarts_track && self.position_at(now) > threshold {
            PreviousAction::RestartTrack
        } else {
            PreviousAction::PreviousTrack
        }
    }
}
