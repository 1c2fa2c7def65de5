use crate::{config::Resolved, error::Result};

/// Install the taps described by `resolved` and block until the event loop
/// exits.
#[cfg(target_os = "macos")]
pub fn run(resolved: &Resolved) -> Result<()> {
    use std::sync::Arc;

    use grabwin_engine::{Actuator, EventTap};
    use mac_mousetap::{Binding, MouseTap};
    use mac_winops::{AxBackend, WindowBackend};
    use tracing::info;

    use crate::error::Error;

    let missing = permissions::check_permissions().missing();
    if !missing.is_empty() {
        return Err(Error::Permissions(missing));
    }

    let backend: Arc<dyn WindowBackend> = Arc::new(AxBackend::new()?);
    let actuator = Actuator::spawn(backend, resolved.actuator)?;

    let mut bindings = Vec::new();
    if let Some(cfg) = resolved.move_tap {
        let tap = Arc::new(EventTap::moving(actuator.handle(), cfg));
        bindings.push(Binding::new(cfg.button, tap));
    }
    if let Some(cfg) = resolved.resize_tap {
        let tap = Arc::new(EventTap::resizing(actuator.handle(), cfg));
        bindings.push(Binding::new(cfg.button, tap));
    }

    let taps = MouseTap::start(bindings)?;
    info!(
        move_tap = ?resolved.move_tap,
        resize_tap = ?resolved.resize_tap,
        tick_hz = resolved.tick_hz,
        "grabwin_running"
    );
    taps.wait();
    info!("grabwin_stopped");
    Ok(())
}

/// Window dragging needs the macOS event tap and Accessibility APIs.
#[cfg(not(target_os = "macos"))]
pub fn run(_resolved: &Resolved) -> Result<()> {
    Err(crate::error::Error::Unsupported)
}
