//! Recording [`WindowControl`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::WindowControl;

/// Counts every window effect.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    minimized: AtomicUsize,
    restored: AtomicUsize,
    fronted: AtomicUsize,
    repaints: AtomicUsize,
}

impl RecordingWindow {
    pub fn minimized(&self) -> usize {
        self.minimized.load(Ordering::SeqCst)
    }

    pub fn restored(&self) -> usize {
        self.restored.load(Ordering::SeqCst)
    }

    pub fn fronted(&self) -> usize {
        self.fronted.load(Ordering::SeqCst)
    }

    pub fn repaints(&self) -> usize {
        self.repaints.load(Ordering::SeqCst)
    }
}

impl WindowControl for RecordingWindow {
    fn minimize(&self) {
        self.minimized.fetch_add(1, Ordering::SeqCst);
    }

    fn restore(&self) {
        self.restored.fetch_add(1, Ordering::SeqCst);
    }

    fn bring_to_front(&self) {
        self.fronted.fetch_add(1, Ordering::SeqCst);
    }

    fn request_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::SeqCst);
    }
}
