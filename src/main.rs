//! nowplaying - media backend built on playerctl.

use std::{error::Error, process};

use clap::Parser;
use nowplaying::{
    cli::{self, Cli, Commands, formatting::format_error},
    config::{Config, ConfigPaths},
    tracing_config,
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigPaths::main_config()?,
    };

    if let Commands::Config { action } = cli.command {
        return cli::print_config(action, &config_path);
    }

    let config = Config::load(&config_path)?;
    let level = cli.log_level.unwrap_or(config.general.log_level);
    let format = config.general.log_format;

    let _guard = if cli.log_file {
        Some(tracing_config::init_with_file(level, format)?)
    } else {
        tracing_config::init(level, format)?;
        None
    };
    debug!(path = %config_path.display(), "Loaded configuration");

    if let Err(e) = cli::run(cli.command, config, config_path).await {
        eprintln!("{}", format_error(&format!("Error: {e}")));
        process::exit(1);
    }

    Ok(())
}
