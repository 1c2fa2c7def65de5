//! macOS permission checks for grabwin.
//!
//! Dragging windows needs two grants: Accessibility, to move and resize other
//! applications' windows, and Input Monitoring, to install an active mouse
//! event tap. Both checks are preflights only. Nothing here prompts; the host
//! tells the user where to grant what is missing.
//!
//! On other platforms every check reports `false`.
#[cfg(target_os = "macos")]
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn CGPreflightListenEventAccess() -> bool;
}

#[cfg(target_os = "macos")]
pub fn accessibility_ok() -> bool {
    unsafe { AXIsProcessTrusted() }
}

#[cfg(not(target_os = "macos"))]
pub fn accessibility_ok() -> bool {
    false
}

/// Check if the application has the "Input Monitoring" permission.
///
/// Returns `true` when the process is allowed to observe mouse events through
/// a CGEvent tap, and `false` otherwise.
#[cfg(target_os = "macos")]
pub fn input_monitoring_ok() -> bool {
    unsafe { CGPreflightListenEventAccess() }
}

/// See the macOS variant.
#[cfg(not(target_os = "macos"))]
pub fn input_monitoring_ok() -> bool {
    false
}

/// Current permission status for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionsStatus {
    /// Accessibility (AX) permission; `true` if granted.
    pub accessibility_ok: bool,
    /// Input Monitoring permission; `true` if granted.
    pub input_ok: bool,
}

impl PermissionsStatus {
    /// Names of the System Settings panes still to be granted.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.accessibility_ok {
            out.push("Accessibility");
        }
        if !self.input_ok {
            out.push("Input Monitoring");
        }
        out
    }
}

/// Query both Accessibility and Input Monitoring permissions.
pub fn check_permissions() -> PermissionsStatus {
    PermissionsStatus {
        accessibility_ok: accessibility_ok(),
        input_ok: input_monitoring_ok(),
    }
}
