/// Position extrapolation between updates
pub mod clock;
/// Named command dispatch
pub mod commands;
/// One-shot playerctl operations
pub mod control;
/// Cover art resolution
pub mod cover;
/// playerctl error types
pub mod error;
/// Events pushed to consumers
pub mod events;
/// Process spawning abstraction
pub mod launcher;
/// Metadata template parsing
pub mod metadata;
/// Per-player behavior table
pub mod quirks;
/// Filtered command execution
pub mod runner;
/// Debounced seeking
pub mod seek;
/// Player filter computation
pub mod selector;
/// Consumer-side now-playing state
pub mod store;
/// Follow-process lifecycle
pub mod supervisor;
/// Playback data types
pub mod types;

pub use clock::PositionClock;
pub use commands::{COMMANDS, CommandKind, CommandOutput, PlayerCommand, invoke};
pub use control::PlayerctlControl;
pub use cover::CoverResolver;
pub use error::PlayerctlError;
pub use events::MediaEvent;
pub use launcher::{FollowProcess, LineStream, ProcessLauncher, ProcessOutput, SystemLauncher};
pub use metadata::{MediaPlayer, PlayerctlMetadata};
pub use quirks::{QuirkProfile, QuirkTable, StatusHandling};
pub use runner::CommandRunner;
pub use seek::{SeekController, SeekFlag, SeekTarget};
pub use selector::{ALL_PLAYERS_ARG, PlayerFilter, compute_filter_arg};
pub use store::{NowPlayingStore, PreviousAction, PreviousPolicy};
pub use supervisor::{Channel, ProcessSupervisor, SupervisorState};
pub use types::{LoopStatus, PlaybackInfo, PlaybackStatus, ShuffleArg, TrackInfo};
