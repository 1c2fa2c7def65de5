#![warn(missing_docs)]

//! Entry point for the `grabwin` binary.

mod cli;
mod config;
mod error;
/// Wires the engine to the real event source and window backend.
mod serve;

use std::process;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Command},
    config::Config,
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, resolve the configuration and run.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let log_spec = cli.log.spec();
    registry()
        .with(logging::env_filter_from_spec(&log_spec))
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply(&cli.overrides);
    let resolved = config.resolve()?;
    debug!(?resolved, "config_resolved");

    match cli.command {
        Some(Command::Check) => {
            println!("{resolved}");
            Ok(())
        }
        None => serve::run(&resolved),
    }
}
