//! [`InputBackend`] backed by the `enigo` crate.
//!
//! Window focus is delegated to [`crate::platform::focus_window_at`], which
//! is a no-op outside Windows.

use std::time::{Duration, Instant};

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use super::{InjectError, InputBackend, InputDriver, SpecialKey};

/// Interval between intermediate pointer positions during a smoothed move.
const MOVE_STEP: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// DesktopDriver
// ---------------------------------------------------------------------------

/// Creates a [`DesktopBackend`] on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopDriver;

impl InputDriver for DesktopDriver {
    fn connect(&self) -> Result<Box<dyn InputBackend>, InjectError> {
        Ok(Box::new(DesktopBackend::new()?))
    }
}

// ---------------------------------------------------------------------------
// DesktopBackend
// ---------------------------------------------------------------------------

/// Real keyboard / pointer control through `enigo`.
pub struct DesktopBackend {
    enigo: Enigo,
}

impl DesktopBackend {
    /// Open an `enigo` handle with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::Backend`] if the platform backend cannot be
    /// initialised (e.g. no display connection).
    pub fn new() -> Result<Self, InjectError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| InjectError::Backend(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn jump(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| InjectError::Pointer(e.to_string()))
    }
}

impl InputBackend for DesktopBackend {
    fn move_pointer(&mut self, x: i32, y: i32, duration: Duration) -> Result<(), InjectError> {
        if duration.is_zero() {
            return self.jump(x, y);
        }

        let (start_x, start_y) = self.pointer_position()?;
        let steps = (duration.as_millis() / MOVE_STEP.as_millis()).max(1) as i32;
        let started = Instant::now();

        for step in 1..=steps {
            let t = f64::from(step) / f64::from(steps);
            let ix = start_x + (f64::from(x - start_x) * t).round() as i32;
            let iy = start_y + (f64::from(y - start_y) * t).round() as i32;
            self.jump(ix, iy)?;

            let due = MOVE_STEP * step as u32;
            if let Some(wait) = due.checked_sub(started.elapsed()) {
                std::thread::sleep(wait);
            }
        }

        // Land exactly on the target regardless of rounding.
        self.jump(x, y)
    }

    fn click(&mut self) -> Result<(), InjectError> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| InjectError::Pointer(e.to_string()))
    }

    fn press_key(&mut self, key: SpecialKey) -> Result<(), InjectError> {
        let key = match key {
            SpecialKey::Enter => Key::Return,
            SpecialKey::Tab => Key::Tab,
        };
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| InjectError::KeySimulation(e.to_string()))
    }

    fn type_chars(&mut self, chunk: &str, interval: Duration) -> Result<(), InjectError> {
        let mut buf = [0u8; 4];
        for (i, c) in chunk.chars().enumerate() {
            if i > 0 && !interval.is_zero() {
                std::thread::sleep(interval);
            }
            self.enigo
                .text(c.encode_utf8(&mut buf))
                .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
        }
        Ok(())
    }

    fn pointer_position(&mut self) -> Result<(i32, i32), InjectError> {
        self.enigo
            .location()
            .map_err(|e| InjectError::Query(e.to_string()))
    }

    fn screen_size(&mut self) -> Result<(i32, i32), InjectError> {
        self.enigo
            .main_display()
            .map_err(|e| InjectError::Query(e.to_string()))
    }

    fn focus_window_at(&mut self, x: i32, y: i32) -> Result<bool, InjectError> {
        Ok(crate::platform::focus_window_at(x, y))
    }

    fn release_all(&mut self) -> Result<(), InjectError> {
        self.enigo
            .button(Button::Left, Direction::Release)
            .map_err(|e| InjectError::Pointer(e.to_string()))?;
        for key in [Key::Shift, Key::Control, Key::Alt] {
            self.enigo
                .key(key, Direction::Release)
                .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
        }
        Ok(())
    }
}
