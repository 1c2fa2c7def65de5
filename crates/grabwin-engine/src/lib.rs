//! grabwin engine
//!
//! Drag-to-move and drag-to-resize for arbitrary windows. The engine sits
//! between an event source (`mac-mousetap`) and a window backend
//! (`mac-winops`):
//!
//! - [`EventTap`] classifies button events for one gesture type and decides,
//!   per event, whether it is consumed. It never blocks: drag samples are
//!   added to the gesture's [`Operation`] with atomic increments.
//! - [`Actuator`] owns a single worker thread that drains every in-flight
//!   operation once per tick and applies the summed delta through the
//!   backend. A mouse-up kicks it so the last motion lands without waiting
//!   for the tick.
//! - [`Move`] and [`Resize`] are the two [`DragHooks`] strategies a tap is
//!   built with.
//!
//! Deltas are raw input units and are applied 1:1 as points.
//!
//! Nothing in the engine is platform specific; tests drive it against
//! `mac_winops::MockBackend`.

pub mod actuator;
mod error;
pub mod gesture;
pub mod operation;
pub mod tap;

pub use actuator::{Actuator, ActuatorConfig, ActuatorHandle, DEFAULT_TICK, MAX_TICK};
pub use error::{Error, Result};
pub use gesture::{Anchor, DragHooks, GestureKind, Move, Resize};
pub use operation::Operation;
pub use tap::{EventTap, TapConfig};
