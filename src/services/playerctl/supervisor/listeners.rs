use std::collections::HashMap;

use tokio::{process::Child, task::JoinHandle};
use tracing::debug;

use crate::services::playerctl::metadata::METADATA_FORMAT;

/// A playerctl `--follow` stream owned by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Playback status
    Status,
    /// Position in seconds
    Position,
    /// Shuffle state
    Shuffle,
    /// Loop status
    Loop,
    /// Volume (0.0 - 1.0)
    Volume,
    /// Metadata blocks, only for players that need it
    Metadata,
}

impl Channel {
    /// Listeners that run whenever the supervisor is running.
    pub const MANDATORY: [Channel; 5] = [
        Channel::Status,
        Channel::Position,
        Channel::Shuffle,
        Channel::Loop,
        Channel::Volume,
    ];

    /// Arguments following `--follow` for this channel.
    pub fn follow_args(self) -> &'static [&'static str] {
        match self {
            Channel::Status => &["status"],
            Channel::Position => &["position"],
            Channel::Shuffle => &["shuffle"],
            Channel::Loop => &["loop"],
            Channel::Volume => &["volume"],
            Channel::Metadata => &["metadata", "--format", METADATA_FORMAT],
        }
    }
}

/// A running follow process and the task reading it.
///
/// Dropping the handle stops the task and kills the process.
pub(super) struct ListenerHandle {
    child: Option<Child>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub(super) fn new(child: Option<Child>, task: JoinHandle<()>) -> Self {
        Self { child, task }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
        let Some(child) = self.child.as_mut() else {
            return;
        };
        if let Err(e) = child.start_kill() {
            debug!(error = %e, "Follow process already gone");
        }
    }
}

/// Membership of the supervisor's process set.
///
/// Only mutated with the supervisor's lock held. `generation` changes on every
/// kill so handlers spawned for an earlier set can recognise they are stale.
#[derive(Default)]
pub(super) struct ListenerSet {
    handles: HashMap<Channel, ListenerHandle>,
    generation: u64,
    probed: bool,
}

impl ListenerSet {
    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    pub(super) fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    pub(super) fn contains(&self, channel: Channel) -> bool {
        self.handles.contains_key(&channel)
    }

    pub(super) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(super) fn insert(&mut self, channel: Channel, handle: ListenerHandle) {
        self.handles.insert(channel, handle);
    }

    pub(super) fn remove(&mut self, channel: Channel) -> bool {
        self.handles.remove(&channel).is_some()
    }

    pub(super) fn probed(&self) -> bool {
        self.probed
    }

    pub(super) fn mark_probed(&mut self) {
        self.probed = true;
    }

    /// Drop every handle and start a new generation.
    pub(super) fn clear(&mut self) -> usize {
        let killed = self.handles.len();
        self.handles.clear();
        self.generation += 1;
        killed
    }
}
