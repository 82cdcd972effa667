//! Command-line interface.
//!
//! `watch` runs the supervisor and streams events, `invoke` and `info` issue
//! one-shot commands, and `config` inspects the configuration.

pub mod formatting;
mod watch;

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};

use crate::{
    config::{Config, LogLevel},
    services::playerctl::{
        COMMANDS, CommandRunner, PlayerFilter, PlayerctlControl, SystemLauncher, invoke,
    },
};

/// Media backend driving playerctl.
#[derive(Debug, Parser)]
#[command(name = "nowplaying", version, about)]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Also write logs to the log directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Action to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level actions.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Listen to the selected players and print every event.
    ///
    /// Lines read from stdin are dispatched as commands, e.g. `PlayPause` or
    /// `SetPosition 30000`.
    Watch {
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Run a single command and print its result as JSON
    Invoke {
        /// Command name, see `nowplaying invoke --list`
        #[arg(required_unless_present = "list")]
        name: Option<String>,

        /// Command arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,

        /// List the available commands
        #[arg(long)]
        list: bool,
    },

    /// Print the current playback snapshot as JSON
    Info,

    /// Inspect the configuration
    Config {
        /// What to print
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Default,
    /// Print the JSON schema of the configuration
    Schema,
    /// Print the configuration file path
    Path,
    /// Write the default configuration unless a file already exists
    Init,
}

/// Run `command`.
///
/// # Errors
/// Returns error if the command fails
pub async fn run(
    command: Commands,
    config: Config,
    config_path: PathBuf,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Watch { json } => watch::run(config, config_path, json).await,
        Commands::Invoke { list: true, .. } => {
            for kind in COMMANDS {
                println!("{} {}", kind.name(), kind.usage());
            }
            Ok(())
        }
        Commands::Invoke { name, args, .. } => {
            let name = name.unwrap_or_default();
            let output = invoke(&one_shot_control(&config), &name, &args).await?;
            println!("{}", serde_json::to_string(&output)?);
            Ok(())
        }
        Commands::Info => {
            let info = one_shot_control(&config).playback_info(None, None).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Commands::Config { action } => print_config(action, &config_path),
    }
}

/// Handle `config` without loading the configuration file.
///
/// # Errors
/// Returns error if the output cannot be rendered
pub fn print_config(action: ConfigAction, config_path: &std::path::Path) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Default => print!("{}", Config::default().to_toml_string()?),
        ConfigAction::Schema => {
            let schema = schemars::schema_for!(Config);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        ConfigAction::Path => println!("{}", config_path.display()),
        ConfigAction::Init => {
            if Config::create_default_file(config_path)? {
                println!("Wrote {}", config_path.display());
            } else {
                println!("{} already exists", config_path.display());
            }
        }
    }
    Ok(())
}

fn one_shot_control(config: &Config) -> PlayerctlControl {
    let filter = PlayerFilter::new();
    filter.update(&config.players);

    let launcher = Arc::new(SystemLauncher::new(config.playerctl.binary.clone()));
    PlayerctlControl::new(CommandRunner::new(
        launcher,
        filter,
        config.playerctl.command_timeout(),
    ))
}
