use std::sync::{Arc, Weak};

use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{Inner, listeners::Channel};
use crate::services::playerctl::{
    control::parse_shuffle,
    events::MediaEvent,
    launcher::LineStream,
    metadata::{MediaPlayer, MetadataBlockBuffer, PlayerctlMetadata},
    quirks::StatusHandling,
    types::{LoopStatus, PlaybackStatus},
};

/// Read `lines` until the stream ends or the supervisor goes away.
pub(super) async fn consume(
    inner: Weak<Inner>,
    channel: Channel,
    generation: u64,
    mut lines: LineStream,
) {
    let mut blocks = MetadataBlockBuffer::new();

    while let Some(line) = lines.next().await {
        let Some(inner) = inner.upgrade() else {
            return;
        };

        match channel {
            Channel::Status => inner.on_status(&line, generation).await,
            Channel::Position => inner.on_position(&line),
            Channel::Shuffle => inner.on_shuffle(&line),
            Channel::Loop => inner.on_loop(&line),
            Channel::Volume => inner.on_volume(&line),
            Channel::Metadata => {
                if let Some(block) = blocks.push(&line) {
                    inner.on_metadata_block(block, generation).await;
                }
            }
        }
    }

    debug!(?channel, generation, "Follow stream ended");
}

impl Inner {
    pub(super) fn emit(&self, event: MediaEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    pub(super) async fn emit_snapshot(
        &self,
        status: Option<PlaybackStatus>,
        metadata: Option<PlayerctlMetadata>,
    ) {
        match self.control.playback_info(status, metadata).await {
            Ok(info) => self.emit(MediaEvent::PlaybackInfoChanged(info)),
            Err(e) => warn!(error = %e, "Failed to assemble playback snapshot"),
        }
    }

    async fn on_status(self: &Arc<Self>, line: &str, generation: u64) {
        let status = PlaybackStatus::from(line);
        if status == PlaybackStatus::Unknown {
            debug!(line, "Discarding status line");
            return;
        }

        let player = self.current_player.get();
        match self.quirks.profile(player).on_status {
            StatusHandling::PositionFastPath => match self.control.position_millis().await {
                Ok(position_milli) => self.emit(MediaEvent::PlaybackStatusChanged {
                    status,
                    position_milli,
                }),
                Err(e) => warn!(%player, error = %e, "Failed to query position"),
            },
            StatusHandling::RefetchMetadata => {
                let metadata = match self.control.metadata().await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(%status, error = %e, "Failed to refetch metadata");
                        return;
                    }
                };
                let player = metadata.player;
                self.emit_snapshot(Some(status), Some(metadata)).await;
                self.set_current_player(player, generation).await;
            }
        }
    }

    fn on_position(&self, line: &str) {
        match line.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => {
                self.emit(MediaEvent::PositionChanged((seconds * 1000.0).trunc() as i64));
            }
            _ => debug!(line, "Discarding position line"),
        }
    }

    fn on_shuffle(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.emit(MediaEvent::ShuffleChanged(parse_shuffle(line)));
    }

    fn on_loop(&self, line: &str) {
        match LoopStatus::parse(line) {
            Some(status) => self.emit(MediaEvent::LoopStatusChanged(status)),
            None => debug!(line, "Discarding loop line"),
        }
    }

    fn on_volume(&self, line: &str) {
        match line.trim().parse::<f64>() {
            Ok(volume) if volume.is_finite() => {
                self.emit(MediaEvent::VolumeChanged(volume * 100.0));
            }
            _ => debug!(line, "Discarding volume line"),
        }
    }

    async fn on_metadata_block(self: &Arc<Self>, block: PlayerctlMetadata, generation: u64) {
        let player = block.player;

        // The first block after a track change has no art yet; the second one does.
        if block.art_url.is_some() {
            self.emit_snapshot(None, Some(block)).await;
        } else {
            debug!(%player, "Skipping metadata block without art URL");
        }

        self.set_current_player(player, generation).await;
    }

    /// Record the active player and start or stop the metadata listener to
    /// match its quirk profile.
    pub(super) async fn set_current_player(self: &Arc<Self>, player: MediaPlayer, generation: u64) {
        let mut set = self.listeners.lock().await;
        if set.generation() != generation || !set.is_running() {
            debug!(%player, generation, "Ignoring player change from stale listener");
            return;
        }

        self.current_player.set(player);

        let wanted = self.quirks.profile(player).follow_metadata;
        let running = set.contains(Channel::Metadata);

        if wanted && !running {
            match self.spawn_listener(Channel::Metadata, generation) {
                Ok(handle) => {
                    info!(%player, "Started metadata listener");
                    set.insert(Channel::Metadata, handle);
                }
                Err(e) => warn!(%player, error = %e, "Failed to start metadata listener"),
            }
        } else if !wanted && running {
            info!(%player, "Stopping metadata listener");
            set.remove(Channel::Metadata);
        }
    }
}
