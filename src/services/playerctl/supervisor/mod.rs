mod handlers;
mod listeners;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, instrument};

pub use listeners::Channel;
use listeners::{ListenerHandle, ListenerSet};

use super::{
    control::PlayerctlControl,
    error::PlayerctlError,
    events::{EVENT_CHANNEL_CAPACITY, MediaEvent, MediaEventSender},
    launcher::ProcessLauncher,
    metadata::MediaPlayer,
    quirks::QuirkTable,
    runner::CommandRunner,
    selector::PlayerFilter,
};
use crate::{config::MediaPlayerSettings, services::common::Property};

/// Lifecycle of the follow-process set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    /// No listeners
    #[default]
    Stopped,
    /// Spawning listeners
    Starting,
    /// All mandatory listeners are up
    Running,
}

/// Owns the long-running playerctl follow processes and turns their output
/// into [`MediaEvent`]s.
///
/// The process set is only touched with an internal lock held, so start,
/// kill and restart never interleave. Cloning yields another handle to the
/// same supervisor.
#[derive(Clone)]
pub struct ProcessSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    control: PlayerctlControl,
    events: MediaEventSender,
    listeners: Mutex<ListenerSet>,
    state: Property<SupervisorState>,
    current_player: Property<MediaPlayer>,
    quirks: QuirkTable,
}

impl ProcessSupervisor {
    /// Create a stopped supervisor.
    pub fn new(control: PlayerctlControl, quirks: QuirkTable) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                control,
                events,
                listeners: Mutex::new(ListenerSet::default()),
                state: Property::new(SupervisorState::Stopped),
                current_player: Property::new(MediaPlayer::Unknown),
                quirks,
            }),
        }
    }

    /// Supervisor over `launcher` with the default quirk table, listening to
    /// every player until settings are applied.
    pub fn with_launcher(launcher: Arc<dyn ProcessLauncher>, command_timeout: Duration) -> Self {
        let runner = CommandRunner::new(launcher, PlayerFilter::new(), command_timeout);
        Self::new(PlayerctlControl::new(runner), QuirkTable::default())
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.inner.events.subscribe()
    }

    /// One-shot command surface sharing this supervisor's player filter.
    pub fn control(&self) -> &PlayerctlControl {
        &self.inner.control
    }

    /// Lifecycle state.
    pub fn state(&self) -> &Property<SupervisorState> {
        &self.inner.state
    }

    /// Player named by the most recent metadata.
    pub fn current_player(&self) -> &Property<MediaPlayer> {
        &self.inner.current_player
    }

    /// Player filter argument currently in use.
    pub fn filter_arg(&self) -> String {
        self.inner.control.runner().filter().current()
    }

    /// Number of live follow processes.
    pub async fn listener_count(&self) -> usize {
        self.inner.listeners.lock().await.len()
    }

    /// Start listening with the players selected by `settings`.
    ///
    /// When already running with the same filter this emits a fresh snapshot
    /// instead. A changed filter restarts the process set.
    ///
    /// # Errors
    /// - `BinaryNotFound` if playerctl is not installed; a
    ///   [`MediaEvent::PlayerctlNotFound`] is emitted as well
    /// - `SpawnFailed` if a follow process cannot be started
    #[instrument(skip_all)]
    pub async fn start(&self, settings: &MediaPlayerSettings) -> Result<(), PlayerctlError> {
        let mut set = self.inner.listeners.lock().await;
        self.start_locked(&mut set, settings).await
    }

    /// Kill every follow process. Safe to call when stopped.
    #[instrument(skip_all)]
    pub async fn kill(&self) {
        let mut set = self.inner.listeners.lock().await;
        self.kill_locked(&mut set);
    }

    /// Kill then start, without letting another lifecycle call in between.
    ///
    /// # Errors
    /// See [`ProcessSupervisor::start`].
    #[instrument(skip_all)]
    pub async fn restart(&self, settings: &MediaPlayerSettings) -> Result<(), PlayerctlError> {
        let mut set = self.inner.listeners.lock().await;
        self.kill_locked(&mut set);
        self.start_locked(&mut set, settings).await
    }

    /// Apply new player settings.
    ///
    /// Restarts only when running and the computed filter argument differs
    /// from the current one. Returns whether a restart happened.
    ///
    /// # Errors
    /// See [`ProcessSupervisor::start`].
    #[instrument(skip_all)]
    pub async fn update_settings(
        &self,
        settings: &MediaPlayerSettings,
    ) -> Result<bool, PlayerctlError> {
        let mut set = self.inner.listeners.lock().await;
        let filter = self.inner.control.runner().filter();

        if filter.preview(settings) == filter.current() {
            debug!(filter = filter.current(), "Player filter unchanged");
            return Ok(false);
        }

        if !set.is_running() {
            filter.update(settings);
            debug!(filter = filter.current(), "Player filter updated while stopped");
            return Ok(false);
        }

        self.kill_locked(&mut set);
        self.start_locked(&mut set, settings).await?;
        Ok(true)
    }

    async fn start_locked(
        &self,
        set: &mut ListenerSet,
        settings: &MediaPlayerSettings,
    ) -> Result<(), PlayerctlError> {
        let filter = self.inner.control.runner().filter();
        let changed = filter.update(settings);

        if set.is_running() {
            if !changed {
                debug!("Already running, emitting snapshot");
                self.inner.emit_snapshot(None, None).await;
                return Ok(());
            }
            info!(filter = filter.current(), "Player filter changed, restarting");
            self.kill_locked(set);
        }

        if !set.probed() {
            if !self.inner.control.runner().probe().await? {
                error!("playerctl is not installed");
                self.inner.emit(MediaEvent::PlayerctlNotFound);
                return Err(PlayerctlError::BinaryNotFound);
            }
            set.mark_probed();
        }

        self.inner.state.set(SupervisorState::Starting);
        let generation = set.generation();

        for channel in Channel::MANDATORY {
            match self.inner.spawn_listener(channel, generation) {
                Ok(handle) => set.insert(channel, handle),
                Err(e) => {
                    error!(?channel, error = %e, "Failed to start listener");
                    self.kill_locked(set);
                    return Err(e);
                }
            }
        }

        self.inner.state.set(SupervisorState::Running);
        info!(filter = filter.current(), "Listening for player changes");
        Ok(())
    }

    fn kill_locked(&self, set: &mut ListenerSet) {
        let killed = set.clear();
        self.inner.current_player.set(MediaPlayer::Unknown);
        self.inner.state.set(SupervisorState::Stopped);

        if killed > 0 {
            info!(killed, "Stopped listeners");
        }
    }
}

impl Inner {
    fn spawn_listener(
        self: &Arc<Self>,
        channel: Channel,
        generation: u64,
    ) -> Result<ListenerHandle, PlayerctlError> {
        let process = self.control.runner().follow(channel.follow_args())?;
        let (lines, child) = process.into_parts();

        let task = tokio::spawn(handlers::consume(
            Arc::downgrade(self),
            channel,
            generation,
            lines,
        ));

        Ok(ListenerHandle::new(child, task))
    }
}
