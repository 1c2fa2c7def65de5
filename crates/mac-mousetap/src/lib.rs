//! mac-mousetap: a mouse-button event tap that asks a handler, per event,
//! whether to consume it or pass it through to the rest of the system.
//!
//! The event model ([`MouseEvent`], [`EventKind`], [`Modifiers`]) and the
//! [`MouseHandler`] protocol are platform independent so handlers can be driven
//! directly in tests. On macOS, [`MouseTap::start`] installs one CoreGraphics
//! event tap per [`Binding`] on a dedicated run-loop thread.
#![warn(missing_docs)]

use std::sync::Arc;

mod error;
mod modifiers;
pub mod policy;
#[cfg(target_os = "macos")]
mod sys;

pub use error::{Error, Result};
pub use modifiers::Modifiers;
#[cfg(target_os = "macos")]
pub use sys::MouseTap;

/// Mouse button a tap is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
}

/// Category of an event delivered to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Bound button pressed.
    Down,
    /// Pointer moved while the bound button is held.
    Dragged,
    /// Bound button released.
    Up,
    /// The OS disabled the tap (callback too slow, or user input).
    TapDisabled,
    /// Any category the tap did not expect; carries the raw type.
    Other(u32),
}

/// A single pointer event as seen by the tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Event category.
    pub kind: EventKind,
    /// Button the delivering tap is bound to.
    pub button: MouseButton,
    /// Screen location, global coordinates with a top-left origin.
    pub x: f64,
    /// See `x`.
    pub y: f64,
    /// Raw horizontal delta since the previous event (drag only, else 0).
    pub dx: i64,
    /// Raw vertical delta since the previous event (drag only, else 0).
    pub dy: i64,
    /// Modifier keys held when the event was generated.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    fn new(kind: EventKind, button: MouseButton, modifiers: Modifiers) -> Self {
        Self {
            kind,
            button,
            x: 0.0,
            y: 0.0,
            dx: 0,
            dy: 0,
            modifiers,
        }
    }

    /// Button press at a screen location.
    pub fn down(button: MouseButton, x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self {
            x,
            y,
            ..Self::new(EventKind::Down, button, modifiers)
        }
    }

    /// Drag sample carrying a raw delta.
    pub fn drag(button: MouseButton, dx: i64, dy: i64, modifiers: Modifiers) -> Self {
        Self {
            dx,
            dy,
            ..Self::new(EventKind::Dragged, button, modifiers)
        }
    }

    /// Button release.
    pub fn up(button: MouseButton, modifiers: Modifiers) -> Self {
        Self::new(EventKind::Up, button, modifiers)
    }

    /// Disabled-by-timeout (or user input) notification.
    pub fn tap_disabled(button: MouseButton) -> Self {
        Self::new(EventKind::TapDisabled, button, Modifiers::empty())
    }

    /// Unexpected category.
    pub fn other(button: MouseButton, raw: u32) -> Self {
        Self::new(EventKind::Other(raw), button, Modifiers::empty())
    }
}

/// What the tap does with an event after the handler saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the event from the system stream.
    Consume,
    /// Deliver the event unmodified.
    PassThrough,
}

impl Disposition {
    /// True for [`Disposition::Consume`].
    pub fn consumed(self) -> bool {
        matches!(self, Self::Consume)
    }
}

/// Receiver of tap events.
///
/// Runs on the event source thread and must return promptly: a slow handler
/// gets the whole tap disabled by the OS.
pub trait MouseHandler: Send + Sync {
    /// Handle one event and decide its fate.
    fn handle(&self, event: &MouseEvent) -> Disposition;
}

/// A button bound to the handler that receives its events.
#[derive(Clone)]
pub struct Binding {
    /// Button to subscribe to.
    pub button: MouseButton,
    /// Handler invoked for each event of that button.
    pub handler: Arc<dyn MouseHandler>,
}

impl Binding {
    /// Bind `handler` to `button`.
    pub fn new(button: MouseButton, handler: Arc<dyn MouseHandler>) -> Self {
        Self { button, handler }
    }

    /// Classify a raw event type for this binding and build its event.
    pub fn event(
        &self,
        raw: u32,
        location: (f64, f64),
        delta: (i64, i64),
        flags: u64,
    ) -> MouseEvent {
        let kind = policy::classify(raw, self.button);
        let (dx, dy) = if kind == EventKind::Dragged {
            delta
        } else {
            (0, 0)
        };
        MouseEvent {
            kind,
            button: self.button,
            x: location.0,
            y: location.1,
            dx,
            dy,
            modifiers: Modifiers::from_cg_flags(flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;
    impl MouseHandler for Nop {
        fn handle(&self, _event: &MouseEvent) -> Disposition {
            Disposition::PassThrough
        }
    }

    #[test]
    fn binding_builds_classified_events() {
        let b = Binding::new(MouseButton::Left, Arc::new(Nop));
        let flags = (1 << 17) | (1 << 20) | 0x100;
        let e = b.event(6, (10.0, 20.0), (3, -2), flags);
        assert_eq!(e.kind, EventKind::Dragged);
        assert_eq!((e.dx, e.dy), (3, -2));
        assert_eq!(e.modifiers, Modifiers::SHIFT | Modifiers::COMMAND);

        // Deltas only travel with drag samples.
        let e = b.event(1, (10.0, 20.0), (3, -2), 0);
        assert_eq!(e.kind, EventKind::Down);
        assert_eq!((e.x, e.y, e.dx, e.dy), (10.0, 20.0, 0, 0));
    }

    #[test]
    fn constructors_fill_expected_fields() {
        let m = Modifiers::OPTION;
        let d = MouseEvent::down(MouseButton::Right, 5.0, 6.0, m);
        assert_eq!((d.kind, d.button, d.x, d.y), (EventKind::Down, MouseButton::Right, 5.0, 6.0));
        let g = MouseEvent::drag(MouseButton::Right, -1, 4, m);
        assert_eq!((g.kind, g.dx, g.dy, g.modifiers), (EventKind::Dragged, -1, 4, m));
        assert_eq!(MouseEvent::other(MouseButton::Left, 22).kind, EventKind::Other(22));
        assert!(Disposition::Consume.consumed());
        assert!(!Disposition::PassThrough.consumed());
    }
}
