use thiserror::Error;

/// Errors surfaced by the drag engine.
///
/// None of these reach the event source: the tap logs them and passes the
/// event through, the actuator logs them and retires the gesture.
#[derive(Error, Debug)]
pub enum Error {
    /// The window backend refused a read or write.
    #[error("window backend: {0}")]
    Backend(#[from] mac_winops::Error),

    /// The actuator has shut down and accepts no new gestures.
    #[error("actuator stopped")]
    ActuatorStopped,

    /// The actuator thread could not be created.
    #[error("failed to spawn actuator thread: {0}")]
    Spawn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
