//! nowplaying - media backend built on playerctl.
//!
//! A [`ProcessSupervisor`](services::playerctl::ProcessSupervisor) keeps a
//! small set of `playerctl --follow` processes alive, normalizes their output
//! into [`MediaEvent`](services::playerctl::MediaEvent)s and applies
//! per-player quirks. One-shot commands go through
//! [`PlayerctlControl`](services::playerctl::PlayerctlControl) or the named
//! dispatch table in [`services::playerctl::commands`].
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use nowplaying::{
//!     config::default_players,
//!     services::playerctl::{ProcessSupervisor, SystemLauncher},
//! };
//!
//! # async fn run() -> Result<(), nowplaying::services::playerctl::PlayerctlError> {
//! let launcher = Arc::new(SystemLauncher::new("playerctl"));
//! let supervisor = ProcessSupervisor::with_launcher(launcher, Duration::from_secs(5));
//! let mut events = supervisor.subscribe();
//!
//! supervisor.start(&default_players()).await?;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface.
pub mod cli;

/// Configuration schema, loading and watching.
pub mod config;

/// Media services.
pub mod services;

/// Logging setup.
pub mod tracing_config;
