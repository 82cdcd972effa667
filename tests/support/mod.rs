//! Scripted stand-in for the playerctl binary.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use nowplaying::{
    config::{MediaPlayerSetting, MediaPlayerSettings},
    services::playerctl::{
        FollowProcess, MediaEvent, ProcessLauncher, ProcessOutput, ProcessSupervisor,
        metadata::METADATA_FORMAT,
    },
};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

struct Follow {
    argv: Vec<String>,
    lines: mpsc::UnboundedSender<String>,
}

/// Records every invocation and answers from a script.
///
/// One-shot responses are keyed by the arguments after the player filter.
/// Unscripted commands succeed with empty output. Follow processes are fed
/// through [`FakeLauncher::push`].
#[derive(Default)]
pub struct FakeLauncher {
    responses: Mutex<HashMap<Vec<String>, ProcessOutput>>,
    stalled: Mutex<HashSet<Vec<String>>>,
    calls: Mutex<Vec<Vec<String>>>,
    follows: Mutex<Vec<Follow>>,
    missing: AtomicBool,
    fail_spawns: AtomicBool,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        let launcher = Self::default();
        launcher.respond_ok(&["--version"], "v2.4.1");
        Arc::new(launcher)
    }

    /// Behaves as if playerctl is not installed.
    pub fn missing() -> Arc<Self> {
        let launcher = Self::default();
        launcher.missing.store(true, Ordering::SeqCst);
        Arc::new(launcher)
    }

    pub fn respond(&self, args: &[&str], output: ProcessOutput) {
        self.responses.lock().unwrap().insert(owned(args), output);
    }

    pub fn respond_ok(&self, args: &[&str], stdout: &str) {
        self.respond(args, ProcessOutput::ok(stdout));
    }

    /// Never answer `args`.
    pub fn stall(&self, args: &[&str]) {
        self.stalled.lock().unwrap().insert(owned(args));
    }

    pub fn fail_spawns(&self) {
        self.fail_spawns.store(true, Ordering::SeqCst);
    }

    /// Script every query a playback snapshot makes.
    pub fn script_snapshot(&self, block: &str, status: &str) {
        self.respond_ok(&["metadata", "--format", METADATA_FORMAT], block);
        self.respond_ok(&["status"], status);
        self.respond_ok(&["shuffle"], "On");
        self.respond_ok(&["loop"], "None");
        self.respond_ok(&["volume"], "0.500000");
        self.respond_ok(&["position"], "42.5");
    }

    /// Full argument vectors of one-shot invocations.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of one-shot invocations whose first argument after the filter
    /// is `command`.
    pub fn count(&self, command: &str) -> usize {
        self.calls()
            .iter()
            .filter(|argv| strip_filter(argv).first().map(String::as_str) == Some(command))
            .count()
    }

    /// Argument vectors of every follow process ever spawned.
    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.follows
            .lock()
            .unwrap()
            .iter()
            .map(|follow| follow.argv.clone())
            .collect()
    }

    /// Argument vectors of follow processes still being read.
    pub fn live(&self) -> Vec<Vec<String>> {
        self.follows
            .lock()
            .unwrap()
            .iter()
            .filter(|follow| !follow.lines.is_closed())
            .map(|follow| follow.argv.clone())
            .collect()
    }

    /// Channels (`status`, `position`, ...) of live follow processes, sorted.
    pub fn live_channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self
            .live()
            .iter()
            .filter_map(|argv| argv.get(2).cloned())
            .collect();
        channels.sort();
        channels
    }

    /// Emit `line` on the newest live follow process of `channel`.
    pub fn push(&self, channel: &str, line: &str) {
        let follows = self.follows.lock().unwrap();
        let follow = follows
            .iter()
            .rev()
            .find(|follow| {
                !follow.lines.is_closed() && follow.argv.get(2).map(String::as_str) == Some(channel)
            })
            .unwrap_or_else(|| panic!("no live {channel} follower"));
        follow.lines.send(line.to_string()).unwrap();
    }

    /// Emit a multi-line block line by line.
    pub fn push_block(&self, channel: &str, block: &str) {
        for line in block.lines() {
            self.push(channel, line);
        }
    }
}

#[async_trait]
impl ProcessLauncher for FakeLauncher {
    async fn output(&self, args: Vec<String>) -> io::Result<ProcessOutput> {
        if self.missing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "playerctl"));
        }

        self.calls.lock().unwrap().push(args.clone());
        let key = strip_filter(&args).to_vec();

        let stalled = self.stalled.lock().unwrap().contains(&key);
        if stalled {
            std::future::pending::<()>().await;
        }

        let response = self.responses.lock().unwrap().get(&key).cloned();
        Ok(response.unwrap_or_else(|| ProcessOutput::ok("")))
    }

    fn spawn_lines(&self, args: Vec<String>) -> io::Result<FollowProcess> {
        if self.missing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "playerctl"));
        }
        if self.fail_spawns.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }

        let (lines, rx) = mpsc::unbounded_channel();
        self.follows.lock().unwrap().push(Follow { argv: args, lines });

        Ok(FollowProcess::from_stream(Box::pin(
            UnboundedReceiverStream::new(rx),
        )))
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

fn strip_filter(argv: &[String]) -> &[String] {
    match argv.first() {
        Some(first) if first.starts_with("--player=") => &argv[1..],
        _ => argv,
    }
}

pub fn players(entries: &[(&str, bool, u32)]) -> MediaPlayerSettings {
    entries
        .iter()
        .map(|(name, enabled, priority)| {
            (
                name.to_string(),
                MediaPlayerSetting {
                    enabled: *enabled,
                    priority: *priority,
                },
            )
        })
        .collect()
}

pub fn supervisor(launcher: &Arc<FakeLauncher>) -> ProcessSupervisor {
    ProcessSupervisor::with_launcher(launcher.clone(), Duration::from_secs(5))
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub async fn next_event(events: &mut broadcast::Receiver<MediaEvent>) -> MediaEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

pub async fn assert_quiet(events: &mut broadcast::Receiver<MediaEvent>) {
    settle().await;
    assert!(
        events.try_recv().is_err(),
        "expected no event to be emitted"
    );
}

/// A metadata block in template order.
pub fn block(title: &str, art_url: &str, player: &str) -> String {
    format!(
        "title:{title}\nartist:Radiohead\nalbum:OK Computer\nurl:file:///music/track.flac\n\
         length:284000000\nartUrl:{art_url}\ntrackid:/org/mpris/{title}\nplayer:{player}"
    )
}
