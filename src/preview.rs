//! Best-effort opening of a written image in the desktop's default viewer.

use std::path::Path;

use log::debug;

use crate::error::{DiagramError, Result};

/// Opens `path` with the system default application.
///
/// Fails with [`DiagramError::DisplayUnavailable`] when there is no display
/// or the viewer cannot be started. The caller decides whether that matters.
pub fn open(path: &Path) -> Result<()> {
    if !display_available() {
        return Err(DiagramError::DisplayUnavailable(
            "neither DISPLAY nor WAYLAND_DISPLAY is set".into(),
        ));
    }

    debug!("opening preview of {}", path.display());
    open::that(path)
        .map_err(|err| DiagramError::DisplayUnavailable(format!("failed to open viewer: {err}")))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_available() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|name| std::env::var_os(name).is_some_and(|value| !value.is_empty()))
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn display_available() -> bool {
    true
}
