//! Input injection: the boundary between the typing core and the OS.
//!
//! # Overview
//!
//! The scheduler and the session worker never talk to the OS directly.  They
//! drive an [`InputBackend`], which exposes exactly the capabilities a
//! typing session needs:
//!
//! | Capability | Method |
//! |------------|--------|
//! | Move the pointer (optionally smoothed) | [`InputBackend::move_pointer`] |
//! | Click at the current pointer position | [`InputBackend::click`] |
//! | Press Enter / Tab | [`InputBackend::press_key`] |
//! | Type a batch of characters | [`InputBackend::type_chars`] |
//! | Query pointer position / screen size | [`InputBackend::pointer_position`], [`InputBackend::screen_size`] |
//! | Force the window under a point to the front | [`InputBackend::focus_window_at`] |
//! | Release any held mouse / modifier state | [`InputBackend::release_all`] |
//!
//! Backends are created through an [`InputDriver`] on the thread that uses
//! them, because the `enigo` handle is not `Send` on every platform.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use auto_type::inject::{DesktopDriver, InputDriver};
//!
//! let mut backend = DesktopDriver.connect().expect("no input backend");
//! backend.move_pointer(400, 300, Duration::from_millis(100)).unwrap();
//! backend.click().unwrap();
//! backend.type_chars("hello", Duration::from_millis(10)).unwrap();
//! ```

pub mod desktop;

#[cfg(test)]
pub mod mock;

pub use desktop::{DesktopBackend, DesktopDriver};

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// All errors that can surface while injecting input.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The OS input backend could not be initialised.
    #[error("cannot initialise input backend: {0}")]
    Backend(String),

    /// Could not simulate a key press/release or type text.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),

    /// Could not move the pointer or click.
    #[error("cannot control the pointer: {0}")]
    Pointer(String),

    /// Could not query pointer position or display geometry.
    #[error("cannot query display: {0}")]
    Query(String),
}

// ---------------------------------------------------------------------------
// SpecialKey
// ---------------------------------------------------------------------------

/// Keys emitted as dedicated key presses rather than typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    /// Emitted for `\n` and `\r`.
    Enter,
    /// Emitted for `\t`.
    Tab,
}

impl SpecialKey {
    /// Map a control character to its key, or `None` for ordinary text.
    pub fn for_char(c: char) -> Option<Self> {
        match c {
            '\n' | '\r' => Some(SpecialKey::Enter),
            '\t' => Some(SpecialKey::Tab),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// InputBackend / InputDriver
// ---------------------------------------------------------------------------

/// OS-level keyboard and pointer control used by a typing session.
pub trait InputBackend {
    /// Move the pointer to absolute screen coordinates.  A non-zero
    /// `duration` animates the move.
    fn move_pointer(&mut self, x: i32, y: i32, duration: Duration) -> Result<(), InjectError>;

    /// Left-click at the current pointer position.
    fn click(&mut self) -> Result<(), InjectError>;

    /// Press and release a special key.
    fn press_key(&mut self, key: SpecialKey) -> Result<(), InjectError>;

    /// Type `chunk`, waiting `interval` between consecutive characters.
    fn type_chars(&mut self, chunk: &str, interval: Duration) -> Result<(), InjectError>;

    /// Current pointer position in screen pixels.
    fn pointer_position(&mut self) -> Result<(i32, i32), InjectError>;

    /// Size of the main display in pixels.
    fn screen_size(&mut self) -> Result<(i32, i32), InjectError>;

    /// Best-effort: bring the top-level window under `(x, y)` to the
    /// foreground.  Returns `Ok(false)` when nothing was focused.
    fn focus_window_at(&mut self, x: i32, y: i32) -> Result<bool, InjectError>;

    /// Release the mouse button and modifier keys.
    fn release_all(&mut self) -> Result<(), InjectError>;
}

/// Factory for [`InputBackend`]s, shareable across threads.
pub trait InputDriver: Send + Sync {
    /// Create a backend bound to the calling thread.
    fn connect(&self) -> Result<Box<dyn InputBackend>, InjectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_chars_map_to_special_keys() {
        assert_eq!(SpecialKey::for_char('\n'), Some(SpecialKey::Enter));
        assert_eq!(SpecialKey::for_char('\r'), Some(SpecialKey::Enter));
        assert_eq!(SpecialKey::for_char('\t'), Some(SpecialKey::Tab));
    }

    #[test]
    fn ordinary_chars_are_not_special() {
        for c in ['a', ' ', '.', '—', 'ก', '\u{0b}'] {
            assert_eq!(SpecialKey::for_char(c), None, "char {c:?}");
        }
    }
}
