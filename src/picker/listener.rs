//! Dedicated OS-thread listener for picking a screen position via `rdev`.
//!
//! `rdev::listen` blocks forever and has no shutdown API, so the thread is
//! started once, on the first [`PositionPicker::arm`], and then stays parked
//! in the OS hook.  While disarmed the callback only tracks the pointer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rdev::{Button, EventType, Key};
use tokio::sync::mpsc;

use super::PickEvent;

// ---------------------------------------------------------------------------
// PickTracker
// ---------------------------------------------------------------------------

/// Per-event state machine run inside the rdev callback.
///
/// `ButtonPress` carries no coordinates, so the last `MouseMove` is kept.
#[derive(Debug, Default)]
pub struct PickTracker {
    last: Option<(f64, f64)>,
}

impl PickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event.  Disarms `armed` when it yields a [`PickEvent`].
    pub fn on_event(&mut self, armed: &AtomicBool, event: &EventType) -> Option<PickEvent> {
        let pick = match event {
            EventType::MouseMove { x, y } => {
                self.last = Some((*x, *y));
                return None;
            }
            EventType::ButtonPress(Button::Left) => {
                let (x, y) = self.last?;
                PickEvent::Picked {
                    x: x.round() as i32,
                    y: y.round() as i32,
                }
            }
            EventType::KeyPress(Key::Escape) => PickEvent::Cancelled,
            _ => return None,
        };

        // Only the first qualifying event after arming counts.
        armed
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| pick)
    }
}

// ---------------------------------------------------------------------------
// PositionPicker
// ---------------------------------------------------------------------------

/// Arms a global one-shot "click anywhere" listener.
///
/// Construct with [`PositionPicker::new`]; poll with
/// [`poll`](Self::poll) every frame.
pub struct PositionPicker {
    armed: Arc<AtomicBool>,
    origin: Option<(i32, i32)>,
    tx: mpsc::UnboundedSender<PickEvent>,
    rx: mpsc::UnboundedReceiver<PickEvent>,
    notify: Arc<dyn Fn() + Send + Sync>,
    /// Never joined; `rdev::listen` does not return.
    thread: Option<std::thread::JoinHandle<()>>,
}

impl PositionPicker {
    /// `notify` is called from the listener thread after each event, e.g.
    /// to request a repaint.
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            origin: None,
            tx,
            rx,
            notify: Arc::new(notify),
            thread: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Pointer position when the picker was armed.
    pub fn origin(&self) -> Option<(i32, i32)> {
        self.origin
    }

    /// Start waiting for a click.  `origin` is where the pointer was.
    pub fn arm(&mut self, origin: Option<(i32, i32)>) -> std::io::Result<()> {
        if self.thread.is_none() {
            self.thread = Some(self.spawn_listener()?);
        }
        // Drop anything left over from an earlier pick.
        while self.rx.try_recv().is_ok() {}
        self.origin = origin;
        self.armed.store(true, Ordering::SeqCst);
        log::debug!("picker: armed (origin {origin:?})");
        Ok(())
    }

    /// Stop waiting.  Returns `false` if it was not armed.
    pub fn disarm(&mut self) -> bool {
        let was_armed = self.armed.swap(false, Ordering::SeqCst);
        if was_armed {
            log::debug!("picker: disarmed");
        }
        was_armed
    }

    pub fn poll(&mut self) -> Option<PickEvent> {
        self.rx.try_recv().ok()
    }

    fn spawn_listener(&self) -> std::io::Result<std::thread::JoinHandle<()>> {
        let armed = Arc::clone(&self.armed);
        let tx = self.tx.clone();
        let notify = Arc::clone(&self.notify);

        std::thread::Builder::new()
            .name("position-picker".into())
            .spawn(move || {
                let mut tracker = PickTracker::new();
                let result = rdev::listen(move |event| {
                    if let Some(pick) = tracker.on_event(&armed, &event.event_type) {
                        log::info!("picker: {pick:?}");
                        let _ = tx.send(pick);
                        notify();
                    }
                });

                if let Err(e) = result {
                    log::error!("position-picker: rdev::listen exited with error: {:?}", e);
                }
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> AtomicBool {
        AtomicBool::new(true)
    }

    #[test]
    fn left_click_picks_last_pointer_position() {
        let flag = armed();
        let mut t = PickTracker::new();
        assert_eq!(
            t.on_event(&flag, &EventType::MouseMove { x: 10.4, y: 20.6 }),
            None
        );
        assert_eq!(
            t.on_event(&flag, &EventType::ButtonPress(Button::Left)),
            Some(PickEvent::Picked { x: 10, y: 21 })
        );
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn escape_cancels() {
        let flag = armed();
        let mut t = PickTracker::new();
        assert_eq!(
            t.on_event(&flag, &EventType::KeyPress(Key::Escape)),
            Some(PickEvent::Cancelled)
        );
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn disarmed_tracker_only_follows_the_pointer() {
        let flag = AtomicBool::new(false);
        let mut t = PickTracker::new();
        t.on_event(&flag, &EventType::MouseMove { x: 5.0, y: 5.0 });
        assert_eq!(t.on_event(&flag, &EventType::ButtonPress(Button::Left)), None);
        assert_eq!(t.on_event(&flag, &EventType::KeyPress(Key::Escape)), None);

        flag.store(true, Ordering::SeqCst);
        assert_eq!(
            t.on_event(&flag, &EventType::ButtonPress(Button::Left)),
            Some(PickEvent::Picked { x: 5, y: 5 })
        );
    }

    #[test]
    fn only_first_event_after_arming_counts() {
        let flag = armed();
        let mut t = PickTracker::new();
        t.on_event(&flag, &EventType::MouseMove { x: 1.0, y: 2.0 });
        assert!(t.on_event(&flag, &EventType::ButtonPress(Button::Left)).is_some());
        assert_eq!(t.on_event(&flag, &EventType::ButtonPress(Button::Left)), None);
    }

    #[test]
    fn click_before_any_move_is_ignored_and_keeps_armed() {
        let flag = armed();
        let mut t = PickTracker::new();
        assert_eq!(t.on_event(&flag, &EventType::ButtonPress(Button::Left)), None);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn other_buttons_and_keys_are_ignored() {
        let flag = armed();
        let mut t = PickTracker::new();
        t.on_event(&flag, &EventType::MouseMove { x: 1.0, y: 1.0 });
        assert_eq!(t.on_event(&flag, &EventType::ButtonPress(Button::Right)), None);
        assert_eq!(t.on_event(&flag, &EventType::KeyPress(Key::Return)), None);
        assert_eq!(t.on_event(&flag, &EventType::ButtonRelease(Button::Left)), None);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn disarm_without_arm_reports_false() {
        let mut picker = PositionPicker::new(|| {});
        assert!(!picker.is_armed());
        assert!(!picker.disarm());
        assert_eq!(picker.poll(), None);
        assert_eq!(picker.origin(), None);
    }
}
