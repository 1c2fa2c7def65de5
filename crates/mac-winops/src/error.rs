use thiserror::Error;

/// Errors produced by window backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Accessibility permission is required but not granted.
    #[error("Accessibility permission missing")]
    Permission,

    /// Nothing window-like could be resolved at the given screen point.
    #[error("no window at ({x}, {y})")]
    NoWindowAt {
        /// Screen x coordinate that was hit-tested.
        x: i64,
        /// Screen y coordinate that was hit-tested.
        y: i64,
    },

    /// An Accessibility API operation failed with the given error code.
    #[error("AX operation failed: code {0}")]
    AxCode(i32),

    /// The AX element became invalid (e.g., window closed) during the operation.
    #[error("AX element invalid (window gone)")]
    WindowGone,

    /// The requested attribute or operation is not supported.
    #[error("Unsupported attribute")]
    Unsupported,

    /// Failure injected by a test backend.
    #[error("injected failure: {0}")]
    Injected(&'static str),
}

impl Error {
    /// Build a `NoWindowAt` error for a hit-tested point, rounding to whole points.
    pub fn no_window_at(x: f64, y: f64) -> Self {
        Self::NoWindowAt {
            x: x.round() as i64,
            y: y.round() as i64,
        }
    }
}

/// Result alias for window backend operations.
pub type Result<T> = std::result::Result<T, Error>;
