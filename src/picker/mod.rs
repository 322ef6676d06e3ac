//! Picking the target position with a global click, backed by `rdev`.
//!
//! # Flow
//!
//! ```text
//! "Set Position" ──▶ PositionPicker::arm(origin)
//!                        │
//!     left click ────────┼──▶ PickEvent::Picked { x, y }
//!     Escape     ────────┼──▶ PickEvent::Cancelled ──▶ restore_pointer(origin)
//!     button again ──────┴──▶ PositionPicker::disarm
//! ```
//!
//! The click is not swallowed: whatever lies under the pointer receives it.

pub mod listener;

use std::time::Duration;

pub use listener::{PickTracker, PositionPicker};

use crate::inject::{InjectError, InputDriver};

/// Smoothing used when returning the pointer after a cancelled pick.
pub const RESTORE_MOVE: Duration = Duration::from_millis(200);

/// Events emitted by the picker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickEvent {
    /// Left click at these screen coordinates.
    Picked { x: i32, y: i32 },
    /// Escape was pressed.
    Cancelled,
}

/// Move the pointer back to where it was before picking started.
pub fn restore_pointer(driver: &dyn InputDriver, origin: (i32, i32)) -> Result<(), InjectError> {
    let mut backend = driver.connect()?;
    backend.move_pointer(origin.0, origin.1, RESTORE_MOVE)
}

/// Current pointer position, if the backend can tell.
pub fn current_pointer(driver: &dyn InputDriver) -> Option<(i32, i32)> {
    match driver.connect().and_then(|mut b| b.pointer_position()) {
        Ok(pos) => Some(pos),
        Err(e) => {
            log::debug!("picker: pointer position unavailable: {e}");
            None
        }
    }
}
