//! Error types and result alias for the mac-mousetap crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Event tap could not be created or initialized.
    #[error("Event tap failed to start")]
    EventTapStart,
    /// Missing or denied system permission.
    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),
    /// A modifier spec contained an unknown word.
    #[error("invalid modifier: {0:?}")]
    InvalidModifier(String),
    /// No bindings were supplied to the event loop.
    #[error("no mouse bindings to install")]
    NoBindings,
}
