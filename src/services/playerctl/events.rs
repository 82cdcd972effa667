use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{LoopStatus, PlaybackInfo, PlaybackStatus};

/// Capacity of the event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Sender half used by the supervisor to publish events.
pub type MediaEventSender = broadcast::Sender<MediaEvent>;

/// Events pushed to the consumer.
///
/// Fire-and-forget: nothing is acknowledged and a slow consumer may lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum MediaEvent {
    /// A complete playback snapshot
    PlaybackInfoChanged(PlaybackInfo),

    /// Status change without a metadata refetch
    PlaybackStatusChanged {
        /// New status
        status: PlaybackStatus,
        /// Position observed alongside the status, in milliseconds
        #[serde(rename = "positionMilli")]
        position_milli: i64,
    },

    /// Authoritative position in milliseconds
    PositionChanged(i64),

    /// Shuffle toggled
    ShuffleChanged(bool),

    /// Loop mode changed
    LoopStatusChanged(LoopStatus),

    /// Volume in the 0 - 100 display range
    VolumeChanged(f64),

    /// The control binary is not installed
    PlayerctlNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(MediaEvent::PositionChanged(1500)).unwrap();
        assert_eq!(json["event"], "PositionChanged");
        assert_eq!(json["data"], 1500);

        let json = serde_json::to_value(MediaEvent::PlaybackStatusChanged {
            status: PlaybackStatus::Paused,
            position_milli: 42,
        })
        .unwrap();
        assert_eq!(json["data"]["status"], "Paused");
        assert_eq!(json["data"]["positionMilli"], 42);

        let json = serde_json::to_value(MediaEvent::PlayerctlNotFound).unwrap();
        assert_eq!(json["event"], "PlayerctlNotFound");
    }
}
