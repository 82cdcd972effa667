use tracing::instrument;

use super::{
    cover::CoverResolver,
    error::PlayerctlError,
    metadata::{METADATA_FORMAT, PlayerctlMetadata},
    runner::CommandRunner,
    types::{LoopStatus, PlaybackInfo, PlaybackStatus, ShuffleArg},
};

/// One-shot playerctl operations against the currently selected players.
#[derive(Clone)]
pub struct PlayerctlControl {
    runner: CommandRunner,
    covers: CoverResolver,
}

impl PlayerctlControl {
    /// Create a control surface over `runner`.
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            covers: CoverResolver::new(),
        }
    }

    /// Runner used for every invocation.
    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Fetch and parse the current metadata block.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn metadata(&self) -> Result<PlayerctlMetadata, PlayerctlError> {
        let output = self
            .runner
            .run(&["metadata", "--format", METADATA_FORMAT])
            .await?;
        Ok(PlayerctlMetadata::parse(output.lines()))
    }

    /// Start playback.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn play(&self) -> Result<(), PlayerctlError> {
        self.runner.run(&["play"]).await.map(drop)
    }

    /// Pause playback.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn pause(&self) -> Result<(), PlayerctlError> {
        self.runner.run(&["pause"]).await.map(drop)
    }

    /// Toggle between playing and paused.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn play_pause(&self) -> Result<(), PlayerctlError> {
        self.runner.run(&["play-pause"]).await.map(drop)
    }

    /// Skip to the next track.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn next(&self) -> Result<(), PlayerctlError> {
        self.runner.run(&["next"]).await.map(drop)
    }

    /// Go back to the previous track.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn previous(&self) -> Result<(), PlayerctlError> {
        self.runner.run(&["previous"]).await.map(drop)
    }

    /// Seek relative to the current position by `offset_seconds`.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn seek(&self, offset_seconds: f64) -> Result<(), PlayerctlError> {
        self.set_position_delta((offset_seconds * 1000.0).round() as i64)
            .await
    }

    /// Current position in milliseconds.
    ///
    /// # Errors
    /// Returns error if playerctl fails or prints something that is not a number.
    pub async fn position_millis(&self) -> Result<i64, PlayerctlError> {
        let output = self.runner.run(&["position"]).await?;
        let seconds = output
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite())
            .ok_or_else(|| PlayerctlError::InvalidOutput {
                command: "position".to_string(),
                output: output.clone(),
            })?;
        Ok((seconds * 1000.0).trunc() as i64)
    }

    /// Jump to an absolute position in milliseconds.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    #[instrument(skip(self))]
    pub async fn set_position(&self, position_milli: i64) -> Result<(), PlayerctlError> {
        let seconds = millis_to_seconds(position_milli.max(0));
        self.runner.run(&["position", seconds.as_str()]).await.map(drop)
    }

    /// Move the position by `delta_milli`, forwards when positive.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn set_position_delta(&self, delta_milli: i64) -> Result<(), PlayerctlError> {
        let sign = if delta_milli >= 0 { '+' } else { '-' };
        let offset = format!("{}{sign}", millis_to_seconds(delta_milli.abs()));
        self.runner.run(&["position", offset.as_str()]).await.map(drop)
    }

    /// Current loop status.
    ///
    /// # Errors
    /// Returns error if playerctl fails or reports an unknown loop value.
    pub async fn loop_status(&self) -> Result<LoopStatus, PlayerctlError> {
        let output = self.runner.run(&["loop"]).await?;
        LoopStatus::parse(&output).ok_or(PlayerctlError::InvalidOutput {
            command: "loop".to_string(),
            output,
        })
    }

    /// Change the loop status.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn set_loop_status(&self, status: LoopStatus) -> Result<(), PlayerctlError> {
        self.runner.run(&["loop", status.as_str()]).await.map(drop)
    }

    /// Current playback status.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn playback_status(&self) -> Result<PlaybackStatus, PlayerctlError> {
        let output = self.runner.run(&["status"]).await?;
        Ok(PlaybackStatus::from(output.as_str()))
    }

    /// Whether shuffle is enabled.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn shuffle(&self) -> Result<bool, PlayerctlError> {
        let output = self.runner.run(&["shuffle"]).await?;
        Ok(parse_shuffle(&output))
    }

    /// Change the shuffle mode.
    ///
    /// # Errors
    /// Returns error if playerctl fails.
    pub async fn set_shuffle(&self, shuffle: ShuffleArg) -> Result<(), PlayerctlError> {
        self.runner.run(&["shuffle", shuffle.as_str()]).await.map(drop)
    }

    /// Volume in the 0.0 - 1.0 range.
    ///
    /// # Errors
    /// Returns error if playerctl fails or prints something that is not a number.
    pub async fn volume(&self) -> Result<f64, PlayerctlError> {
        let output = self.runner.run(&["volume"]).await?;
        output
            .parse::<f64>()
            .ok()
            .filter(|volume| volume.is_finite())
            .ok_or(PlayerctlError::InvalidOutput {
                command: "volume".to_string(),
                output,
            })
    }

    /// Set the volume to a level (`0.4`) or by a delta (`0.1+`, `0.1-`).
    ///
    /// # Errors
    /// Returns `InvalidArgument` for malformed levels, or the playerctl failure.
    pub async fn set_volume(&self, volume: &str) -> Result<(), PlayerctlError> {
        let volume = volume.trim();
        if !is_volume_arg(volume) {
            return Err(PlayerctlError::InvalidArgument {
                command: "SetVolume".to_string(),
                reason: format!("'{volume}' is not a level or a delta like 0.1+"),
            });
        }
        self.runner.run(&["volume", volume]).await.map(drop)
    }

    /// Assemble a complete playback snapshot.
    ///
    /// `status` and `metadata` are fetched when not supplied.
    ///
    /// # Errors
    /// Returns the first playerctl failure encountered.
    #[instrument(skip(self, metadata))]
    pub async fn playback_info(
        &self,
        status: Option<PlaybackStatus>,
        metadata: Option<PlayerctlMetadata>,
    ) -> Result<PlaybackInfo, PlayerctlError> {
        let metadata = match metadata {
            Some(metadata) => metadata,
            None => self.metadata().await?,
        };
        let playback_status = match status {
            Some(status) => status,
            None => self.playback_status().await?,
        };

        let cover = self.covers.resolve(metadata.art_url.as_deref()).await;
        let track_info = metadata.to_track_info(cover);

        let shuffle = self.shuffle().await?;
        let loop_status = self.loop_status().await?;
        let volume = self.volume().await?;
        let position_milli = self.position_millis().await?;

        Ok(PlaybackInfo {
            track_info,
            shuffle,
            loop_status,
            playback_status,
            volume,
            position_milli,
        })
    }
}

/// Interpret playerctl's shuffle output.
pub fn parse_shuffle(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true")
}

fn millis_to_seconds(millis: i64) -> String {
    (millis as f64 / 1000.0).to_string()
}

fn is_volume_arg(volume: &str) -> bool {
    let level = volume
        .strip_suffix(['+', '-'])
        .unwrap_or(volume);
    level
        .parse::<f64>()
        .is_ok_and(|level| level.is_finite() && level >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_output_is_lenient() {
        assert!(parse_shuffle("On"));
        assert!(parse_shuffle("true"));
        assert!(!parse_shuffle("Off"));
        assert!(!parse_shuffle(""));
    }

    #[test]
    fn seconds_are_formatted_without_trailing_zeroes() {
        assert_eq!(millis_to_seconds(12_000), "12");
        assert_eq!(millis_to_seconds(12_500), "12.5");
        assert_eq!(millis_to_seconds(0), "0");
    }

    #[test]
    fn volume_arguments_are_validated() {
        assert!(is_volume_arg("0.5"));
        assert!(is_volume_arg("0.1+"));
        assert!(is_volume_arg("0.05-"));
        assert!(!is_volume_arg("loud"));
        assert!(!is_volume_arg("-0.5"));
        assert!(!is_volume_arg(""));
    }
}
