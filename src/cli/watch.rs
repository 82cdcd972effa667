use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::StreamExt;
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast::error::RecvError, mpsc},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::formatting::{format_dim, format_error, format_event};
use crate::{
    config::{Config, ConfigWatcher, FileEvent, FileEventKind},
    services::playerctl::{
        CommandOutput, MediaEvent, NowPlayingStore, PlayerCommand, PlayerctlError,
        PreviousAction, ProcessSupervisor, SeekController, SystemLauncher, invoke,
    },
};

struct Session {
    supervisor: ProcessSupervisor,
    seeker: SeekController,
    store: NowPlayingStore,
    json: bool,
}

pub(super) async fn run(
    config: Config,
    config_path: PathBuf,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let launcher = Arc::new(SystemLauncher::new(config.playerctl.binary.clone()));
    let supervisor =
        ProcessSupervisor::with_launcher(launcher, config.playerctl.command_timeout());
    let mut events = supervisor.subscribe();

    let seeker = SeekController::spawn(
        supervisor.control().clone(),
        config.playerctl.seek_debounce(),
    );
    let store = NowPlayingStore::new(seeker.flag(), config.playerctl.previous_policy());
    let mut session = Session {
        supervisor,
        seeker,
        store,
        json,
    };

    if let Err(e) = session.supervisor.start(&config.players).await {
        if let Ok(event) = events.try_recv() {
            session.print_event(&event);
        }
        return Err(e.into());
    }

    let (_watcher, mut file_events) = match ConfigWatcher::watch(&config_path) {
        Ok((watcher, rx)) => (Some(watcher), rx),
        Err(e) => {
            warn!(error = %e, "Configuration changes will not be picked up");
            let (_, rx) = mpsc::unbounded_channel::<FileEvent>();
            (None, rx)
        }
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let supervisor = session.supervisor.clone();
    let states = supervisor.state().watch();
    tokio::pin!(states);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, stopping listeners");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    session.store.apply(&event, Instant::now());
                    session.print_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped events"),
                Err(RecvError::Closed) => break,
            },
            Some(state) = states.next() => debug!(?state, "Supervisor state"),
            Some(event) = file_events.recv() => {
                if event.kind != FileEventKind::Removed {
                    session.reload(&config_path).await;
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => session.handle_input(&line).await,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
        }
    }

    session.supervisor.kill().await;
    Ok(())
}

impl Session {
    fn print_event(&self, event: &MediaEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "Failed to serialize event"),
            }
        } else {
            let position = self.store.position_at(Instant::now());
            println!("{}", format_event(event, &self.store, position));
        }
    }

    async fn reload(&self, config_path: &Path) {
        let config = match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid configuration");
                return;
            }
        };

        match self.supervisor.update_settings(&config.players).await {
            Ok(true) => info!(filter = self.supervisor.filter_arg(), "Player selection reloaded"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to apply player selection"),
        }
    }

    async fn handle_input(&mut self, line: &str) {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return;
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        let result = match name {
            "SetPosition" => self.seek(name, &args),
            "Previous" if args.is_empty() => self.previous().await,
            _ => invoke(self.supervisor.control(), name, &args).await,
        };

        self.print_result(name, result);
    }

    fn seek(&mut self, name: &str, args: &[String]) -> Result<CommandOutput, PlayerctlError> {
        let PlayerCommand::SetPosition { position_milli } = PlayerCommand::parse(name, args)?
        else {
            return Ok(CommandOutput::Done);
        };

        if self.seeker.request(position_milli) {
            self.store.record_position(position_milli, Instant::now());
        } else if !self.json {
            println!("{}", format_dim("seek already in progress"));
        }
        Ok(CommandOutput::Done)
    }

    async fn previous(&mut self) -> Result<CommandOutput, PlayerctlError> {
        let control = self.supervisor.control();
        match self.store.previous_action(Instant::now()) {
            PreviousAction::RestartTrack => {
                control.set_position(0).await?;
                self.store.record_position(0, Instant::now());
            }
            PreviousAction::PreviousTrack => control.previous().await?,
        }
        Ok(CommandOutput::Done)
    }

    fn print_result(&self, name: &str, result: Result<CommandOutput, PlayerctlError>) {
        match (result, self.json) {
            (Ok(CommandOutput::Done), false) => {}
            (Ok(output), false) => match serde_json::to_string(&output) {
                Ok(output) => println!("{name}: {output}"),
                Err(e) => warn!(error = %e, "Failed to serialize result"),
            },
            (Ok(output), true) => println!("{}", json!({ "command": name, "result": output })),
            (Err(e), false) => println!("{}", format_error(&format!("{name}: {e}"))),
            (Err(e), true) => println!("{}", json!({ "command": name, "error": e.to_string() })),
        }
    }
}
