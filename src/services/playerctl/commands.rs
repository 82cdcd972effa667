use serde::Serialize;
use tracing::{instrument, warn};

use super::{
    control::PlayerctlControl,
    error::PlayerctlError,
    metadata::PlayerctlMetadata,
    types::{LoopStatus, PlaybackStatus, ShuffleArg},
};

/// Tag of every command a consumer may invoke by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Fetch the metadata block
    GetMetadata,
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Toggle playback
    PlayPause,
    /// Next track
    Next,
    /// Previous track
    Previous,
    /// Relative seek in seconds
    Seek,
    /// Position in milliseconds
    GetPosition,
    /// Absolute position in milliseconds
    SetPosition,
    /// Relative position in milliseconds
    SetPositionDelta,
    /// Loop status
    GetLoopStatus,
    /// Change loop status
    SetLoopStatus,
    /// Playback status
    GetPlaybackStatus,
    /// Shuffle state
    GetShuffle,
    /// Change shuffle
    SetShuffle,
    /// Volume (0.0 - 1.0)
    GetVolume,
    /// Change volume
    SetVolume,
}

/// Dispatch table: every command that can be invoked by name.
pub const COMMANDS: [CommandKind; 17] = [
    CommandKind::GetMetadata,
    CommandKind::Play,
    CommandKind::Pause,
    CommandKind::PlayPause,
    CommandKind::Next,
    CommandKind::Previous,
    CommandKind::Seek,
    CommandKind::GetPosition,
    CommandKind::SetPosition,
    CommandKind::SetPositionDelta,
    CommandKind::GetLoopStatus,
    CommandKind::SetLoopStatus,
    CommandKind::GetPlaybackStatus,
    CommandKind::GetShuffle,
    CommandKind::SetShuffle,
    CommandKind::GetVolume,
    CommandKind::SetVolume,
];

impl CommandKind {
    /// Look up a command by its dispatch name.
    ///
    /// # Errors
    /// Returns `UnknownCommand` when no entry matches.
    pub fn lookup(name: &str) -> Result<Self, PlayerctlError> {
        COMMANDS
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| PlayerctlError::UnknownCommand(name.to_string()))
    }

    /// Dispatch name of this command.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::GetMetadata => "GetMetadata",
            CommandKind::Play => "Play",
            CommandKind::Pause => "Pause",
            CommandKind::PlayPause => "PlayPause",
            CommandKind::Next => "Next",
            CommandKind::Previous => "Previous",
            CommandKind::Seek => "Seek",
            CommandKind::GetPosition => "GetPosition",
            CommandKind::SetPosition => "SetPosition",
            CommandKind::SetPositionDelta => "SetPositionDelta",
            CommandKind::GetLoopStatus => "GetLoopStatus",
            CommandKind::SetLoopStatus => "SetLoopStatus",
            CommandKind::GetPlaybackStatus => "GetPlaybackStatus",
            CommandKind::GetShuffle => "GetShuffle",
            CommandKind::SetShuffle => "SetShuffle",
            CommandKind::GetVolume => "GetVolume",
            CommandKind::SetVolume => "SetVolume",
        }
    }

    /// Argument synopsis shown in help output, empty for commands without
    /// arguments.
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Seek => "<offset-seconds>",
            CommandKind::SetPosition => "<position-ms>",
            CommandKind::SetPositionDelta => "<delta-ms>",
            CommandKind::SetLoopStatus => "<None|Track|Playlist>",
            CommandKind::SetShuffle => "<On|Off|Toggle>",
            CommandKind::SetVolume => "<level|delta+|delta->",
            CommandKind::GetMetadata
            | CommandKind::Play
            | CommandKind::Pause
            | CommandKind::PlayPause
            | CommandKind::Next
            | CommandKind::Previous
            | CommandKind::GetPosition
            | CommandKind::GetLoopStatus
            | CommandKind::GetPlaybackStatus
            | CommandKind::GetShuffle
            | CommandKind::GetVolume => "",
        }
    }
}

/// A command with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Fetch the metadata block
    GetMetadata,
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Toggle playback
    PlayPause,
    /// Next track
    Next,
    /// Previous track
    Previous,
    /// Relative seek
    Seek {
        /// Offset in seconds, negative seeks backwards
        offset_seconds: f64,
    },
    /// Position in milliseconds
    GetPosition,
    /// Absolute seek
    SetPosition {
        /// Target in milliseconds
        position_milli: i64,
    },
    /// Relative seek in milliseconds
    SetPositionDelta {
        /// Offset in milliseconds, negative seeks backwards
        delta_milli: i64,
    },
    /// Loop status
    GetLoopStatus,
    /// Change loop status
    SetLoopStatus(LoopStatus),
    /// Playback status
    GetPlaybackStatus,
    /// Shuffle state
    GetShuffle,
    /// Change shuffle
    SetShuffle(ShuffleArg),
    /// Volume
    GetVolume,
    /// Change volume to a level or by a delta
    SetVolume(String),
}

impl PlayerCommand {
    /// Build a command from its dispatch name and string arguments.
    ///
    /// # Errors
    /// - `UnknownCommand` if `name` is not in [`COMMANDS`]
    /// - `InvalidArgument` if the arguments do not fit the command
    pub fn parse(name: &str, args: &[String]) -> Result<Self, PlayerctlError> {
        let kind = CommandKind::lookup(name)?;

        let command = match kind {
            CommandKind::GetMetadata => no_args(kind, args, PlayerCommand::GetMetadata)?,
            CommandKind::Play => no_args(kind, args, PlayerCommand::Play)?,
            CommandKind::Pause => no_args(kind, args, PlayerCommand::Pause)?,
            CommandKind::PlayPause => no_args(kind, args, PlayerCommand::PlayPause)?,
            CommandKind::Next => no_args(kind, args, PlayerCommand::Next)?,
            CommandKind::Previous => no_args(kind, args, PlayerCommand::Previous)?,
            CommandKind::GetPosition => no_args(kind, args, PlayerCommand::GetPosition)?,
            CommandKind::GetLoopStatus => no_args(kind, args, PlayerCommand::GetLoopStatus)?,
            CommandKind::GetPlaybackStatus => {
                no_args(kind, args, PlayerCommand::GetPlaybackStatus)?
            }
            CommandKind::GetShuffle => no_args(kind, args, PlayerCommand::GetShuffle)?,
            CommandKind::GetVolume => no_args(kind, args, PlayerCommand::GetVolume)?,
            CommandKind::Seek => PlayerCommand::Seek {
                offset_seconds: number_arg(kind, args)?,
            },
            CommandKind::SetPosition => PlayerCommand::SetPosition {
                position_milli: number_arg(kind, args)?.round() as i64,
            },
            CommandKind::SetPositionDelta => PlayerCommand::SetPositionDelta {
                delta_milli: number_arg(kind, args)?.round() as i64,
            },
            CommandKind::SetLoopStatus => {
                let status = single_arg(kind, args)?
                    .parse::<LoopStatus>()
                    .map_err(|reason| invalid(kind, reason))?;
                PlayerCommand::SetLoopStatus(status)
            }
            CommandKind::SetShuffle => {
                let shuffle = single_arg(kind, args)?
                    .parse::<ShuffleArg>()
                    .map_err(|reason| invalid(kind, reason))?;
                PlayerCommand::SetShuffle(shuffle)
            }
            CommandKind::SetVolume => PlayerCommand::SetVolume(single_arg(kind, args)?.to_string()),
        };

        Ok(command)
    }

    /// Tag of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            PlayerCommand::GetMetadata => CommandKind::GetMetadata,
            PlayerCommand::Play => CommandKind::Play,
            PlayerCommand::Pause => CommandKind::Pause,
            PlayerCommand::PlayPause => CommandKind::PlayPause,
            PlayerCommand::Next => CommandKind::Next,
            PlayerCommand::Previous => CommandKind::Previous,
            PlayerCommand::Seek { .. } => CommandKind::Seek,
            PlayerCommand::GetPosition => CommandKind::GetPosition,
            PlayerCommand::SetPosition { .. } => CommandKind::SetPosition,
            PlayerCommand::SetPositionDelta { .. } => CommandKind::SetPositionDelta,
            PlayerCommand::GetLoopStatus => CommandKind::GetLoopStatus,
            PlayerCommand::SetLoopStatus(_) => CommandKind::SetLoopStatus,
            PlayerCommand::GetPlaybackStatus => CommandKind::GetPlaybackStatus,
            PlayerCommand::GetShuffle => CommandKind::GetShuffle,
            PlayerCommand::SetShuffle(_) => CommandKind::SetShuffle,
            PlayerCommand::GetVolume => CommandKind::GetVolume,
            PlayerCommand::SetVolume(_) => CommandKind::SetVolume,
        }
    }

    /// Run this command against `control`.
    ///
    /// # Errors
    /// Returns the playerctl failure of the underlying invocation.
    pub async fn execute(self, control: &PlayerctlControl) -> Result<CommandOutput, PlayerctlError> {
        let output = match self {
            PlayerCommand::GetMetadata => CommandOutput::Metadata(control.metadata().await?),
            PlayerCommand::Play => done(control.play().await?),
            PlayerCommand::Pause => done(control.pause().await?),
            PlayerCommand::PlayPause => done(control.play_pause().await?),
            PlayerCommand::Next => done(control.next().await?),
            PlayerCommand::Previous => done(control.previous().await?),
            PlayerCommand::Seek { offset_seconds } => done(control.seek(offset_seconds).await?),
            PlayerCommand::GetPosition => CommandOutput::Position(control.position_millis().await?),
            PlayerCommand::SetPosition { position_milli } => {
                done(control.set_position(position_milli).await?)
            }
            PlayerCommand::SetPositionDelta { delta_milli } => {
                done(control.set_position_delta(delta_milli).await?)
            }
            PlayerCommand::GetLoopStatus => CommandOutput::LoopStatus(control.loop_status().await?),
            PlayerCommand::SetLoopStatus(status) => done(control.set_loop_status(status).await?),
            PlayerCommand::GetPlaybackStatus => {
                CommandOutput::PlaybackStatus(control.playback_status().await?)
            }
            PlayerCommand::GetShuffle => CommandOutput::Shuffle(control.shuffle().await?),
            PlayerCommand::SetShuffle(shuffle) => done(control.set_shuffle(shuffle).await?),
            PlayerCommand::GetVolume => CommandOutput::Volume(control.volume().await?),
            PlayerCommand::SetVolume(volume) => done(control.set_volume(&volume).await?),
        };

        Ok(output)
    }
}

/// Value returned by an invoked command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    /// The command has no result
    Done,
    /// Metadata block
    Metadata(PlayerctlMetadata),
    /// Position in milliseconds
    Position(i64),
    /// Loop status
    LoopStatus(LoopStatus),
    /// Playback status
    PlaybackStatus(PlaybackStatus),
    /// Shuffle state
    Shuffle(bool),
    /// Volume (0.0 - 1.0)
    Volume(f64),
}

/// Look up `name`, parse `args` and run the command.
///
/// # Errors
/// Returns `UnknownCommand` for names outside the dispatch table, otherwise
/// the parse or execution failure.
#[instrument(skip(control))]
pub async fn invoke(
    control: &PlayerctlControl,
    name: &str,
    args: &[String],
) -> Result<CommandOutput, PlayerctlError> {
    let command = PlayerCommand::parse(name, args).inspect_err(|e| {
        if matches!(e, PlayerctlError::UnknownCommand(_)) {
            warn!(name, "Unknown command");
        }
    })?;

    command.execute(control).await.inspect_err(|e| {
        warn!(name, error = %e, "Command failed");
    })
}

fn done((): ()) -> CommandOutput {
    CommandOutput::Done
}

fn invalid(kind: CommandKind, reason: impl Into<String>) -> PlayerctlError {
    PlayerctlError::InvalidArgument {
        command: kind.name().to_string(),
        reason: reason.into(),
    }
}

fn no_args(
    kind: CommandKind,
    args: &[String],
    command: PlayerCommand,
) -> Result<PlayerCommand, PlayerctlError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(invalid(kind, format!("takes no arguments, got {}", args.len())))
    }
}

fn single_arg(kind: CommandKind, args: &[String]) -> Result<&str, PlayerctlError> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(invalid(
            kind,
            format!("expected {}, got {} arguments", kind.usage(), args.len()),
        )),
    }
}

fn number_arg(kind: CommandKind, args: &[String]) -> Result<f64, PlayerctlError> {
    let arg = single_arg(kind, args)?;
    arg.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(kind, format!("'{arg}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn ordinal(kind: CommandKind) -> usize {
        match kind {
            CommandKind::GetMetadata => 0,
            CommandKind::Play => 1,
            CommandKind::Pause => 2,
            CommandKind::PlayPause => 3,
            CommandKind::Next => 4,
            CommandKind::Previous => 5,
            CommandKind::Seek => 6,
            CommandKind::GetPosition => 7,
            CommandKind::SetPosition => 8,
            CommandKind::SetPositionDelta => 9,
            CommandKind::GetLoopStatus => 10,
            CommandKind::SetLoopStatus => 11,
            CommandKind::GetPlaybackStatus => 12,
            CommandKind::GetShuffle => 13,
            CommandKind::SetShuffle => 14,
            CommandKind::GetVolume => 15,
            CommandKind::SetVolume => 16,
        }
    }

    #[test]
    fn every_kind_is_in_the_table_once() {
        for (index, kind) in COMMANDS.into_iter().enumerate() {
            assert_eq!(ordinal(kind), index, "{kind:?} out of place");
        }
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in COMMANDS {
            assert_eq!(CommandKind::lookup(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn commands_with_arguments_have_a_usage() {
        assert_eq!(CommandKind::SetPosition.usage(), "<position-ms>");
        assert_eq!(CommandKind::Play.usage(), "");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = PlayerCommand::parse("Explode", &[]).unwrap_err();
        assert!(matches!(err, PlayerctlError::UnknownCommand(name) if name == "Explode"));

        assert!(matches!(
            PlayerCommand::parse("play", &[]),
            Err(PlayerctlError::UnknownCommand(_))
        ));
    }

    #[test]
    fn arguments_are_parsed_per_command() {
        assert_eq!(
            PlayerCommand::parse("SetPosition", &args(&["12500.4"])).unwrap(),
            PlayerCommand::SetPosition {
                position_milli: 12_500
            }
        );
        assert_eq!(
            PlayerCommand::parse("SetShuffle", &args(&["Toggle"])).unwrap(),
            PlayerCommand::SetShuffle(ShuffleArg::Toggle)
        );
        assert_eq!(
            PlayerCommand::parse("SetLoopStatus", &args(&["Playlist"])).unwrap(),
            PlayerCommand::SetLoopStatus(LoopStatus::Playlist)
        );
        assert_eq!(
            PlayerCommand::parse("Seek", &args(&["-5"])).unwrap(),
            PlayerCommand::Seek {
                offset_seconds: -5.0
            }
        );
    }

    #[test]
    fn bad_arguments_are_invalid() {
        for (name, values) in [
            ("Play", vec!["now"]),
            ("Seek", vec![]),
            ("Seek", vec!["fast"]),
            ("SetLoopStatus", vec!["Forever"]),
            ("SetVolume", vec!["0.1", "0.2"]),
        ] {
            let err = PlayerCommand::parse(name, &args(&values)).unwrap_err();
            assert!(
                matches!(err, PlayerctlError::InvalidArgument { .. }),
                "{name} {values:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn kind_matches_parsed_command() {
        let command = PlayerCommand::parse("SetVolume", &args(&["0.3+"])).unwrap();
        assert_eq!(command.kind(), CommandKind::SetVolume);
    }
}
