use std::{cell::RefCell, collections::HashMap, ffi::c_void, ptr, thread_local};

use core_foundation::{
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};
use tracing::{debug, trace};

use crate::{
    WindowBackend, WindowRef,
    error::{Error, Result},
    geom::{Point, Size},
};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateSystemWide() -> *mut c_void;
    fn AXUIElementCopyElementAtPosition(
        application: *mut c_void,
        x: f32,
        y: f32,
        element: *mut *mut c_void,
    ) -> i32;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXUIElementSetAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: CFTypeRef,
    ) -> i32;
    fn AXUIElementPerformAction(element: *mut c_void, action: CFStringRef) -> i32;

    // AXValue helpers for CGPoint/CGSize
    fn AXValueCreate(theType: i32, valuePtr: *const c_void) -> CFTypeRef;
    fn AXValueGetValue(theValue: CFTypeRef, theType: i32, valuePtr: *mut c_void) -> bool;
}

// AXValue type constants (per Apple docs)
const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
// AX error for invalid UI element (window closed / stale reference)
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;

thread_local! {
    static ATTR_STRINGS: RefCell<HashMap<&'static str, CFString>> = RefCell::new(HashMap::new());
}

fn cfstr(name: &'static str) -> CFStringRef {
    // Cache CFStrings per thread instead of relying on toll-free bridging of
    // static strings, which can trip pointer authentication on recent macOS.
    ATTR_STRINGS.with(|cell| {
        let mut m = cell.borrow_mut();
        let s = m.entry(name).or_insert_with(|| CFString::new(name));
        s.as_concrete_TypeRef()
    })
}

fn ax_check() -> Result<()> {
    if permissions::accessibility_ok() {
        Ok(())
    } else {
        Err(Error::Permission)
    }
}

fn ax_err(err: i32) -> Error {
    if err == K_AX_ERROR_INVALID_UI_ELEMENT {
        Error::WindowGone
    } else {
        Error::AxCode(err)
    }
}

/// RAII guard that releases a retained AX element on drop.
pub(crate) struct AXElem(*mut c_void);

// SAFETY: AXUIElementRef is an immutable CF object; retain/release and AX
// attribute calls are thread-safe.
unsafe impl Send for AXElem {}
unsafe impl Sync for AXElem {}

impl AXElem {
    /// Take ownership of an element returned under the create rule.
    #[inline]
    fn from_create(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() { None } else { Some(Self(ptr)) }
    }
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Drop for AXElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

fn ax_copy_elem(element: *mut c_void, attr: CFStringRef) -> Result<AXElem> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    if err != 0 {
        return Err(ax_err(err));
    }
    AXElem::from_create(v as *mut c_void).ok_or(Error::Unsupported)
}

fn ax_get_string(element: *mut c_void, attr: CFStringRef) -> Option<String> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    if err != 0 || v.is_null() {
        return None;
    }
    let s = unsafe { CFString::wrap_under_create_rule(v as _) };
    Some(s.to_string())
}

fn ax_get_value<T: Default>(element: *mut c_void, attr: CFStringRef, kind: i32) -> Result<T> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    if err != 0 {
        return Err(ax_err(err));
    }
    if v.is_null() {
        return Err(Error::Unsupported);
    }
    let mut out = T::default();
    let ok = unsafe { AXValueGetValue(v, kind, &mut out as *mut T as *mut c_void) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(Error::Unsupported);
    }
    Ok(out)
}

fn ax_set_value<T>(element: *mut c_void, attr: CFStringRef, kind: i32, value: &T) -> Result<()> {
    let v = unsafe { AXValueCreate(kind, value as *const T as *const c_void) };
    if v.is_null() {
        return Err(Error::Unsupported);
    }
    let err = unsafe { AXUIElementSetAttributeValue(element, attr, v) };
    unsafe { CFRelease(v) };
    if err != 0 {
        return Err(ax_err(err));
    }
    Ok(())
}

/// Accessibility-backed window backend.
pub struct AxBackend {
    system: AXElem,
}

impl AxBackend {
    /// Create a backend bound to the system-wide AX element.
    pub fn new() -> Result<Self> {
        ax_check()?;
        let system =
            AXElem::from_create(unsafe { AXUIElementCreateSystemWide() }).ok_or(Error::Unsupported)?;
        Ok(Self { system })
    }

    fn elem(window: &WindowRef) -> Result<*mut c_void> {
        window.ax().map(AXElem::as_ptr).ok_or(Error::Unsupported)
    }
}

impl WindowBackend for AxBackend {
    fn window_at(&self, at: Point) -> Result<WindowRef> {
        let mut raw: *mut c_void = ptr::null_mut();
        let err = unsafe {
            AXUIElementCopyElementAtPosition(self.system.as_ptr(), at.x as f32, at.y as f32, &mut raw)
        };
        if err != 0 {
            debug!(x = at.x, y = at.y, err, "ax_element_at_position_failed");
            return Err(Error::no_window_at(at.x, at.y));
        }
        let hit = AXElem::from_create(raw).ok_or_else(|| Error::no_window_at(at.x, at.y))?;
        let role = ax_get_string(hit.as_ptr(), cfstr("AXRole")).unwrap_or_default();
        trace!(x = at.x, y = at.y, role = %role, "ax_hit");
        if role == "AXWindow" {
            return Ok(WindowRef::from_ax(hit));
        }
        // Hit a child element; walk to its owning window. `hit` releases on return.
        match ax_copy_elem(hit.as_ptr(), cfstr("AXWindow")) {
            Ok(w) => Ok(WindowRef::from_ax(w)),
            Err(e) => {
                debug!(x = at.x, y = at.y, role = %role, error = %e, "ax_window_for_element_failed");
                Err(Error::no_window_at(at.x, at.y))
            }
        }
    }

    fn position(&self, window: &WindowRef) -> Result<Point> {
        ax_get_value(Self::elem(window)?, cfstr("AXPosition"), K_AX_VALUE_CGPOINT_TYPE)
    }

    fn set_position(&self, window: &WindowRef, to: Point) -> Result<()> {
        ax_set_value(Self::elem(window)?, cfstr("AXPosition"), K_AX_VALUE_CGPOINT_TYPE, &to)
    }

    fn size(&self, window: &WindowRef) -> Result<Size> {
        ax_get_value(Self::elem(window)?, cfstr("AXSize"), K_AX_VALUE_CGSIZE_TYPE)
    }

    fn set_size(&self, window: &WindowRef, to: Size) -> Result<()> {
        ax_set_value(Self::elem(window)?, cfstr("AXSize"), K_AX_VALUE_CGSIZE_TYPE, &to)
    }

    fn raise(&self, window: &WindowRef) -> Result<()> {
        let err = unsafe { AXUIElementPerformAction(Self::elem(window)?, cfstr("AXRaise")) };
        if err != 0 {
            return Err(ax_err(err));
        }
        Ok(())
    }
}
