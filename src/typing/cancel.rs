//! Cooperative cancellation and cancellation-aware sleeping.
//!
//! A [`CancellationToken`] is created per session, set by the controller and
//! polled by the worker.  Once set it stays set; a new session gets a new
//! token.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CancellationToken
// ---------------------------------------------------------------------------

/// Shared stop flag.  Cheap to clone; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

/// Blocks the worker between steps.
///
/// Implementations should return early once `cancel` is set.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancellationToken);
}

/// Real sleeper: sleeps in slices so a cancellation is noticed within one
/// slice.
#[derive(Debug, Clone, Copy)]
pub struct ThreadSleeper {
    slice: Duration,
}

impl ThreadSleeper {
    pub const DEFAULT_SLICE: Duration = Duration::from_millis(50);

    pub fn new() -> Self {
        Self {
            slice: Self::DEFAULT_SLICE,
        }
    }
}

impl Default for ThreadSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancellationToken) {
        // No representable deadline: sleep until cancelled.
        let deadline = Instant::now().checked_add(duration);
        loop {
            if cancel.is_cancelled() {
                return;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    self.slice.min(deadline - now)
                }
                None => self.slice,
            };
            std::thread::sleep(slice);
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSleeper (tests)
// ---------------------------------------------------------------------------

/// Records requested durations without sleeping.  Optionally cancels the
/// token once `cancel_after` sleeps have been requested.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub delays: Vec<Duration>,
    pub cancel_after: Option<usize>,
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancellationToken) {
        self.delays.push(duration);
        if self.cancel_after == Some(self.delays.len()) {
            cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
