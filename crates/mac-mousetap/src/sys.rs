//! macOS event tap (CoreGraphics) integration for mouse-button interception.
//!
//! We use `core-graphics`' `CGEventTap` because its `CallbackResult::Drop`
//! maps to a NULL `CGEventRef` at the C boundary, which is the only way
//! CoreGraphics suppresses delivery. Consumed events therefore never reach the
//! application under the cursor.

use std::{
    ffi::c_void,
    sync::{
        Arc,
        atomic::{AtomicPtr, Ordering},
    },
    thread,
};

use core_foundation::{
    base::TCFType,
    mach_port::CFMachPortRef,
    runloop::{CFRunLoop, kCFRunLoopCommonModes},
};
use core_graphics::event::{self as cge, CallbackResult, EventField};
use crossbeam_channel::{Sender, bounded};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{Binding, EventKind, MouseButton, MouseEvent, policy};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

// Shared control handle to stop the run loop from other threads.
struct SysControl {
    rl: Mutex<Option<CFRunLoop>>,
}

impl SysControl {
    fn new() -> Self {
        Self {
            rl: Mutex::new(None),
        }
    }

    fn set_rl(&self, rl: CFRunLoop) {
        let mut g = self.rl.lock();
        *g = Some(rl);
    }

    fn stop(&self) {
        let mut g = self.rl.lock();
        if let Some(rl) = g.take() {
            rl.stop();
        }
    }
}

fn cg_types(button: MouseButton) -> Vec<cge::CGEventType> {
    match button {
        MouseButton::Left => vec![
            cge::CGEventType::LeftMouseDown,
            cge::CGEventType::LeftMouseDragged,
            cge::CGEventType::LeftMouseUp,
        ],
        MouseButton::Right => vec![
            cge::CGEventType::RightMouseDown,
            cge::CGEventType::RightMouseDragged,
            cge::CGEventType::RightMouseUp,
        ],
    }
}

fn install(binding: Binding) -> crate::Result<cge::CGEventTap<'static>> {
    // Capture for re-enabling the tap from inside the closure.
    let tap_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));
    let tap_port_ptr_cb = tap_port_ptr.clone();
    let button = binding.button;

    debug!(?button, "creating_mouse_tap");
    let tap = cge::CGEventTap::new(
        cge::CGEventTapLocation::Session,
        cge::CGEventTapPlacement::HeadInsertEventTap,
        cge::CGEventTapOptions::Default,
        cg_types(button),
        move |_proxy, etype, event| {
            // Disabled notifications carry no usable event payload.
            if policy::classify(etype as u32, button) == EventKind::TapDisabled {
                let _ = binding.handler.handle(&MouseEvent::tap_disabled(button));
                let p = tap_port_ptr_cb.load(Ordering::SeqCst) as CFMachPortRef;
                if !p.is_null() {
                    warn!(?button, "tap_disabled_by_os_reenabling");
                    unsafe { CGEventTapEnable(p, true) };
                }
                return CallbackResult::Keep;
            }

            let loc = event.location();
            let ev = binding.event(
                etype as u32,
                (loc.x, loc.y),
                (
                    event.get_integer_value_field(EventField::MOUSE_EVENT_DELTA_X),
                    event.get_integer_value_field(EventField::MOUSE_EVENT_DELTA_Y),
                ),
                event.get_flags().bits(),
            );
            trace!(
                kind = ?ev.kind,
                x = ev.x,
                y = ev.y,
                dx = ev.dx,
                dy = ev.dy,
                mods = %ev.modifiers,
                "tap_event"
            );

            if binding.handler.handle(&ev).consumed() {
                CallbackResult::Drop
            } else {
                CallbackResult::Keep
            }
        },
    )
    .map_err(|_| {
        warn!(?button, "event_tap_create_failed");
        crate::Error::EventTapStart
    })?;

    tap_port_ptr.store(
        tap.mach_port().as_concrete_TypeRef() as *mut c_void,
        Ordering::SeqCst,
    );
    Ok(tap)
}

fn run_event_loop(
    bindings: Vec<Binding>,
    ready: &Sender<crate::Result<()>>,
    ctrl: &SysControl,
) -> crate::Result<()> {
    // Preflight Input Monitoring permission.
    if !permissions::input_monitoring_ok() {
        warn!("input_monitoring_permission_missing");
        return Err(crate::Error::PermissionDenied("Input Monitoring"));
    }

    let rl = CFRunLoop::get_current();
    let mode = unsafe { kCFRunLoopCommonModes };
    let mut taps = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let tap = install(binding)?;
        let source = tap.mach_port().create_runloop_source(0).map_err(|_| {
            warn!("run_loop_source_create_failed");
            crate::Error::EventTapStart
        })?;
        rl.add_source(&source, mode);
        tap.enable();
        taps.push(tap);
    }
    ctrl.set_rl(rl);

    let _ = ready.send(Ok(()));
    debug!(taps = taps.len(), "mouse_tap_started_run_loop");

    CFRunLoop::run_current();

    debug!("mouse_tap_exited");
    Ok(())
}

/// Running set of mouse taps on a dedicated run-loop thread.
///
/// Dropping the handle stops the run loop and joins the thread.
pub struct MouseTap {
    ctrl: Arc<SysControl>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MouseTap {
    /// Install one tap per binding and start delivering events.
    ///
    /// Returns once every tap is enabled, or with the first installation error.
    pub fn start(bindings: Vec<Binding>) -> crate::Result<Self> {
        if bindings.is_empty() {
            return Err(crate::Error::NoBindings);
        }
        let (ready_tx, ready_rx) = bounded(1);
        let ctrl = Arc::new(SysControl::new());
        let ctrl_t = ctrl.clone();
        let thread = thread::Builder::new()
            .name("mousetap".into())
            .spawn(move || {
                if let Err(e) = run_event_loop(bindings, &ready_tx, &ctrl_t) {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|_| crate::Error::EventTapStart)?;
        let mut tap = Self {
            ctrl,
            thread: Some(thread),
        };
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(tap),
            Ok(Err(e)) => {
                tap.join();
                Err(e)
            }
            Err(_) => {
                tap.join();
                Err(crate::Error::EventTapStart)
            }
        }
    }

    /// Stop delivering events. Safe to call more than once.
    pub fn stop(&self) {
        self.ctrl.stop();
    }

    /// Block until the run loop exits.
    pub fn wait(mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(t) = self.thread.take()
            && t.join().is_err()
        {
            warn!("mouse_tap_thread_panicked");
        }
    }
}

impl Drop for MouseTap {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}
