//! mac-winops: the window backend used by grabwin.
//!
//! A backend resolves the window under a screen point and reads or writes its
//! origin and extent. The drag engine only talks to the [`WindowBackend`]
//! trait, so the macOS Accessibility implementation ([`AxBackend`]) can be
//! swapped for the scriptable [`MockBackend`] in tests.
//!
//! Window handles ([`WindowRef`]) are reference counted: cloning retains the
//! underlying element and dropping the last clone releases it, on every exit
//! path.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

#[cfg(target_os = "macos")]
mod ax;
mod error;
pub mod geom;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

#[cfg(target_os = "macos")]
pub use ax::AxBackend;
pub use error::{Error, Result};
pub use geom::{Point, Rect, Size};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockBackend, Write};

/// Trait abstraction over window operations so the engine can be tested.
///
/// Implementations must be callable from any thread: resolution happens on
/// the event source thread, geometry writes on the actuator thread.
pub trait WindowBackend: Send + Sync {
    /// Resolve the topmost window at a screen point.
    fn window_at(&self, at: Point) -> Result<WindowRef>;
    /// Current window origin.
    fn position(&self, window: &WindowRef) -> Result<Point>;
    /// Move the window origin.
    fn set_position(&self, window: &WindowRef, to: Point) -> Result<()>;
    /// Current window extent.
    fn size(&self, window: &WindowRef) -> Result<Size>;
    /// Change the window extent.
    fn set_size(&self, window: &WindowRef, to: Size) -> Result<()>;
    /// Bring the window to the front of its application.
    fn raise(&self, window: &WindowRef) -> Result<()>;
}

/// Reference-counted, opaque handle to a window owned by some backend.
#[derive(Clone)]
pub struct WindowRef(Arc<Handle>);

enum Handle {
    #[cfg(target_os = "macos")]
    Ax(ax::AXElem),
    Synthetic(Synthetic),
}

/// Backend-free window identity, used by mocks and alternate backends.
struct Synthetic {
    id: u64,
    /// Live-handle counter shared with the creating backend, if tracked.
    live: Option<Arc<AtomicUsize>>,
}

impl Drop for Synthetic {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl WindowRef {
    /// Wrap a plain numeric window identity.
    pub fn synthetic(id: u64) -> Self {
        Self(Arc::new(Handle::Synthetic(Synthetic { id, live: None })))
    }

    /// Wrap an identity whose live count is tracked through `live`.
    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) fn tracked(id: u64, live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::new(Handle::Synthetic(Synthetic {
            id,
            live: Some(live.clone()),
        })))
    }

    #[cfg(target_os = "macos")]
    pub(crate) fn from_ax(elem: ax::AXElem) -> Self {
        Self(Arc::new(Handle::Ax(elem)))
    }

    #[cfg(target_os = "macos")]
    pub(crate) fn ax(&self) -> Option<&ax::AXElem> {
        match &*self.0 {
            Handle::Ax(e) => Some(e),
            Handle::Synthetic(_) => None,
        }
    }

    /// Stable identity for logging and lookups. For AX handles this is the
    /// element address, which is only meaningful while the handle is alive.
    pub fn id(&self) -> u64 {
        match &*self.0 {
            #[cfg(target_os = "macos")]
            Handle::Ax(e) => e.as_ptr() as u64,
            Handle::Synthetic(s) => s.id,
        }
    }

    /// True when both handles share the same retained element.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live clones of this handle.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl fmt::Debug for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            #[cfg(target_os = "macos")]
            Handle::Ax(_) => write!(f, "WindowRef(ax:{:#x})", self.id()),
            Handle::Synthetic(s) => write!(f, "WindowRef({})", s.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_handles_release_once_on_last_drop() {
        let live = Arc::new(AtomicUsize::new(0));
        let a = WindowRef::tracked(7, &live);
        assert_eq!(live.load(Ordering::SeqCst), 1);
        let b = a.clone();
        assert_eq!(a.holders(), 2);
        assert!(a.ptr_eq(&b));
        drop(a);
        assert_eq!(live.load(Ordering::SeqCst), 1);
        drop(b);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn synthetic_identity_and_debug() {
        let w = WindowRef::synthetic(42);
        assert_eq!(w.id(), 42);
        assert_eq!(format!("{w:?}"), "WindowRef(42)");
        assert!(!w.ptr_eq(&WindowRef::synthetic(42)));
    }
}
