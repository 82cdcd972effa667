/// Shared service building blocks
pub mod common;
/// playerctl media backend
pub mod playerctl;

pub use playerctl::{MediaEvent, PlayerctlControl, PlayerctlError, ProcessSupervisor};
