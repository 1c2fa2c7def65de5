//! Error handling for the grabwin binary.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for grabwin startup.
pub type Result<T> = result::Result<T, Error>;

/// Everything that can stop grabwin from starting.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The configuration file is not valid RON for [`crate::config::Config`].
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser message, including position.
        message: String,
    },
    /// The configuration parsed but describes an unusable setup.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Required macOS privacy grants are missing.
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    #[error("missing permissions: {}; grant them in System Settings > Privacy & Security", .0.join(", "))]
    Permissions(Vec<&'static str>),
    /// Window backend failure during startup.
    #[error("window backend: {0}")]
    Backend(#[from] mac_winops::Error),
    /// The mouse event tap could not be installed.
    #[error("event tap: {0}")]
    Tap(#[from] mac_mousetap::Error),
    /// The drag engine failed to start.
    #[error("engine: {0}")]
    Engine(#[from] grabwin_engine::Error),
    /// Not running on macOS.
    #[error("grabwin needs macOS to intercept the mouse and move windows")]
    Unsupported,
}
