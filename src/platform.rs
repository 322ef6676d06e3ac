//! Windows-only helpers: foreground focus and elevation detection.
//!
//! Both degrade to harmless defaults on other platforms so the rest of the
//! crate needs no `cfg` attributes.

/// Bring the top-level window under screen point `(x, y)` to the
/// foreground.
///
/// Windows restricts `SetForegroundWindow` for background processes, so
/// this also calls `SetActiveWindow` and `BringWindowToTop`.  Returns
/// `true` when `SetForegroundWindow` reported success.
#[cfg(windows)]
pub fn focus_window_at(x: i32, y: i32) -> bool {
    use winapi::shared::windef::POINT;
    use winapi::um::winuser::{
        BringWindowToTop, GetAncestor, SetActiveWindow, SetForegroundWindow, WindowFromPoint,
        GA_ROOT,
    };

    // SAFETY: plain Win32 calls on handles returned by the system; a null
    // handle is checked before use.
    unsafe {
        let hwnd = WindowFromPoint(POINT { x, y });
        if hwnd.is_null() {
            log::debug!("focus: no window at ({x}, {y})");
            return false;
        }

        let root = GetAncestor(hwnd, GA_ROOT);
        let target = if root.is_null() { hwnd } else { root };

        let focused = SetForegroundWindow(target) != 0;
        SetActiveWindow(target);
        BringWindowToTop(target);

        log::debug!("focus: window at ({x}, {y}) foreground={focused}");
        focused
    }
}

#[cfg(not(windows))]
pub fn focus_window_at(x: i32, y: i32) -> bool {
    log::debug!("focus: window focus unsupported on this platform ({x}, {y})");
    false
}

/// Whether the process runs with administrator rights.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    // SAFETY: IsUserAnAdmin takes no arguments and has no preconditions.
    unsafe { winapi::um::shlobj::IsUserAnAdmin() != 0 }
}

#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}
