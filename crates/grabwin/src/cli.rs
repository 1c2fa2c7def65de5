//! Command-line interface definitions for grabwin.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

use crate::config::Button;

/// Command-line interface for the `grabwin` binary.
#[derive(Parser, Debug)]
#[command(
    name = "grabwin",
    about = "Move and resize any window by dragging with a modifier held",
    version
)]
pub struct Cli {
    /// Logging controls shared across grabwin binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Path to a RON configuration file. Defaults apply when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Per-setting overrides applied on top of the configuration file.
    #[command(flatten)]
    pub overrides: Overrides,

    /// Optional subcommand; without one grabwin runs until interrupted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Validate the configuration, print the resolved bindings and exit.
    Check,
}

/// Command-line overrides for individual configuration fields.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Modifiers for the move gesture, e.g. "cmd+shift".
    #[arg(long, value_name = "SPEC", global = true)]
    pub move_modifiers: Option<String>,

    /// Modifiers for the resize gesture, e.g. "opt+shift".
    #[arg(long, value_name = "SPEC", global = true)]
    pub resize_modifiers: Option<String>,

    /// Mouse button for the move gesture.
    #[arg(long, value_enum, value_name = "BUTTON", global = true)]
    pub move_button: Option<Button>,

    /// Mouse button for the resize gesture.
    #[arg(long, value_enum, value_name = "BUTTON", global = true)]
    pub resize_button: Option<Button>,

    /// Raise windows when a gesture grabs them.
    #[arg(long, global = true)]
    pub raise: bool,

    /// Geometry updates per second while dragging.
    #[arg(long, value_name = "HZ", global = true)]
    pub tick_hz: Option<u32>,
}
