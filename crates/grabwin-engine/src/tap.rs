//! Turns a stream of button events into the start/drag/end gesture lifecycle.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use mac_mousetap::{Disposition, EventKind, Modifiers, MouseButton, MouseEvent, MouseHandler};
use mac_winops::Point;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    actuator::ActuatorHandle,
    gesture::{DragHooks, GestureKind, Move, Resize},
    operation::Operation,
};

/// Binding of one gesture to a button and a modifier combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapConfig {
    pub button: MouseButton,
    /// Modifiers that must all be held at mouse-down. Extra ones are ignored.
    pub modifiers: Modifiers,
    /// Raise the grabbed window when the gesture starts.
    pub raise: bool,
}

impl TapConfig {
    pub fn new(button: MouseButton, modifiers: Modifiers) -> Self {
        Self {
            button,
            modifiers,
            raise: false,
        }
    }
}

/// One gesture type bound to one button.
///
/// Idle until a mouse-down carrying the required modifiers lands on a window,
/// dragging until the matching mouse-up. Only one gesture can be in flight.
pub struct EventTap {
    hooks: Arc<dyn DragHooks>,
    actuator: ActuatorHandle,
    button: MouseButton,
    required: AtomicU64,
    raise: AtomicBool,
    active: Mutex<Option<Arc<Operation>>>,
}

impl EventTap {
    pub fn new(hooks: Arc<dyn DragHooks>, actuator: ActuatorHandle, config: TapConfig) -> Self {
        debug!(
            kind = %hooks.kind(),
            button = ?config.button,
            modifiers = %config.modifiers,
            raise = config.raise,
            "tap_created"
        );
        Self {
            hooks,
            actuator,
            button: config.button,
            required: AtomicU64::new(config.modifiers.bits()),
            raise: AtomicBool::new(config.raise),
            active: Mutex::new(None),
        }
    }

    pub fn moving(actuator: ActuatorHandle, config: TapConfig) -> Self {
        Self::new(Arc::new(Move), actuator, config)
    }

    pub fn resizing(actuator: ActuatorHandle, config: TapConfig) -> Self {
        Self::new(Arc::new(Resize), actuator, config)
    }

    pub fn kind(&self) -> GestureKind {
        self.hooks.kind()
    }

    pub fn button(&self) -> MouseButton {
        self.button
    }

    /// Replace the required modifier mask. Applies from the next mouse-down;
    /// a gesture already in flight keeps going.
    pub fn set_modifiers(&self, modifiers: Modifiers) {
        self.required.store(modifiers.bits(), Ordering::SeqCst);
        debug!(kind = %self.kind(), modifiers = %modifiers, "tap_modifiers_set");
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_bits_truncate(self.required.load(Ordering::SeqCst))
    }

    pub fn set_raise(&self, raise: bool) {
        self.raise.store(raise, Ordering::SeqCst);
    }

    pub fn is_dragging(&self) -> bool {
        self.active.lock().is_some()
    }

    /// The in-flight gesture, if any.
    pub fn active(&self) -> Option<Arc<Operation>> {
        self.active.lock().clone()
    }

    pub fn on_mouse_down(&self, ev: &MouseEvent) -> Disposition {
        let required = self.modifiers();
        if !ev.modifiers.satisfies(required) {
            trace!(kind = %self.kind(), held = %ev.modifiers, %required, "tap_modifiers_mismatch");
            return Disposition::PassThrough;
        }

        let mut active = self.active.lock();
        // A record the actuator already retired may linger until its
        // mouse-up; a new press replaces it.
        assert!(
            active.as_ref().is_none_or(|op| op.is_completed()),
            "{} tap received a second mouse-down while a gesture is active",
            self.kind()
        );

        let backend = self.actuator.backend();
        let window = match backend.window_at(Point::new(ev.x, ev.y)) {
            Ok(w) => w,
            Err(e) => {
                debug!(kind = %self.kind(), x = ev.x, y = ev.y, error = %e, "tap_no_window");
                return Disposition::PassThrough;
            }
        };
        let anchor = match self.hooks.start(backend.as_ref(), &window) {
            Ok(a) => a,
            Err(e) => {
                warn!(kind = %self.kind(), ?window, error = %e, "drag_start_rejected");
                return Disposition::PassThrough;
            }
        };

        let op = Arc::new(Operation::new(
            window,
            anchor,
            self.hooks.clone(),
            self.raise.load(Ordering::SeqCst),
        ));
        if let Err(e) = self.actuator.submit(op.clone()) {
            warn!(kind = %self.kind(), error = %e, "drag_submit_failed");
            return Disposition::PassThrough;
        }
        debug!(id = op.id(), kind = %self.kind(), window = ?op.window(), ?anchor, "drag_start");
        *active = Some(op);
        Disposition::Consume
    }

    pub fn on_mouse_drag(&self, _ev: &MouseEvent, dx: i64, dy: i64) -> Disposition {
        match self.active.lock().as_ref() {
            Some(op) if !op.is_completed() => {
                op.accumulate(dx, dy);
                Disposition::Consume
            }
            // Retired or forced complete: nothing would ever apply the motion.
            _ => Disposition::PassThrough,
        }
    }

    pub fn on_mouse_up(&self, _ev: &MouseEvent) -> Disposition {
        let Some(op) = self.active.lock().take() else {
            return Disposition::PassThrough;
        };
        op.complete();
        self.actuator.wake();
        debug!(id = op.id(), kind = %self.kind(), pending = ?op.pending(), "drag_release");
        Disposition::Consume
    }

    /// Mark the in-flight gesture completed, if any, and hand it to the
    /// actuator for its final apply.
    fn finish_active(&self) -> bool {
        let Some(op) = self.active.lock().take() else {
            return false;
        };
        op.complete();
        self.actuator.wake();
        true
    }
}

impl MouseHandler for EventTap {
    fn handle(&self, ev: &MouseEvent) -> Disposition {
        match ev.kind {
            EventKind::Down => self.on_mouse_down(ev),
            EventKind::Dragged => self.on_mouse_drag(ev, ev.dx, ev.dy),
            EventKind::Up => self.on_mouse_up(ev),
            EventKind::TapDisabled => {
                // The release that ends the current gesture may be lost.
                let ended = self.finish_active();
                warn!(kind = %self.kind(), ended, "tap_disabled");
                Disposition::PassThrough
            }
            EventKind::Other(raw) => {
                warn!(kind = %self.kind(), raw, "tap_unexpected_event");
                Disposition::PassThrough
            }
        }
    }
}

impl Drop for EventTap {
    fn drop(&mut self) {
        if self.finish_active() {
            debug!(kind = %self.kind(), "tap_dropped_mid_gesture");
        }
    }
}
