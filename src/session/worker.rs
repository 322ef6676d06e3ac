//! Body of the `typing-session` worker thread.
//!
//! Runs one [`Session`] from countdown to completion and reports every step
//! through a [`StatusSink`].  The controlling window is restored by a drop
//! guard, so it comes back on success, cancellation, error and unwinding
//! alike.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::SessionTimings;
use crate::inject::{InjectError, InputBackend, InputDriver};
use crate::typing::{
    CancellationToken, SchedulerOptions, Sleeper, TypingScheduler, STATUS_STOPPED,
};

use super::state::{Session, SessionEvent, SessionOutcome, SessionState};
use super::WindowControl;

// ---------------------------------------------------------------------------
// StatusSink
// ---------------------------------------------------------------------------

/// Worker-side end of the event channel.  Every send also wakes the UI.
#[derive(Clone)]
pub struct StatusSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
    window: Arc<dyn WindowControl>,
}

impl StatusSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionEvent>, window: Arc<dyn WindowControl>) -> Self {
        Self { tx, window }
    }

    pub fn send(&self, event: SessionEvent) {
        // The receiver only disappears when the UI is gone.
        let _ = self.tx.send(event);
        self.window.request_repaint();
    }

    pub fn status(&self, message: impl Into<String>) {
        self.send(SessionEvent::Status(message.into()));
    }

    pub fn state(&self, state: SessionState) {
        self.send(SessionEvent::State(state));
    }
}

/// Restores the window when dropped.
struct RestoreGuard(Arc<dyn WindowControl>);

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.0.restore();
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Everything the worker thread owns.
pub struct Worker {
    pub session: Session,
    pub options: SchedulerOptions,
    pub timings: SessionTimings,
    pub driver: Arc<dyn InputDriver>,
    pub window: Arc<dyn WindowControl>,
    pub sink: StatusSink,
}

impl Worker {
    /// Run the session and report its outcome as the final event.
    pub fn run(self, sleeper: &mut dyn Sleeper) {
        let sink = self.sink.clone();
        let outcome = self.drive(sleeper);
        match &outcome {
            SessionOutcome::Completed => log::info!("session: completed"),
            SessionOutcome::Cancelled => log::info!("session: cancelled"),
            SessionOutcome::Failed(reason) => log::error!("session: failed: {reason}"),
        }
        sink.send(SessionEvent::Finished(outcome));
    }

    fn drive(self, sleeper: &mut dyn Sleeper) -> SessionOutcome {
        let _restore = RestoreGuard(Arc::clone(&self.window));
        let cancel = &self.session.cancel;
        let sink = &self.sink;

        if cancel.is_cancelled() {
            sink.status("Stopped");
            return SessionOutcome::Cancelled;
        }

        let mut backend = match self.driver.connect() {
            Ok(backend) => backend,
            Err(e) => {
                sink.status(format!("Error: {e}"));
                return SessionOutcome::Failed(e.to_string());
            }
        };

        // ── Countdown ────────────────────────────────────────────────────
        sink.state(SessionState::Countdown);
        if !countdown(self.session.config.countdown_secs, &self.timings, sleeper, cancel, sink) {
            sink.status("Stopped before typing");
            return SessionOutcome::Cancelled;
        }

        // ── Positioning ──────────────────────────────────────────────────
        sink.state(SessionState::Positioning);
        self.window.minimize();
        sleeper.sleep(ms(self.timings.minimize_settle_ms), cancel);
        if cancel.is_cancelled() {
            sink.status(STATUS_STOPPED);
            return SessionOutcome::Cancelled;
        }

        sink.status("Moving cursor to position...");
        if let Err(e) = self.position(backend.as_mut(), sleeper) {
            log::warn!("session: positioning failed: {e}");
            sink.status(format!("Error positioning cursor: {e}"));
        }

        if cancel.is_cancelled() {
            sink.status(STATUS_STOPPED);
            return SessionOutcome::Cancelled;
        }

        // ── Typing ───────────────────────────────────────────────────────
        sink.state(SessionState::Typing);
        sink.status("Typing started...");
        {
            let mut scheduler = TypingScheduler::new(backend.as_mut(), sleeper, self.options);
            scheduler.emit(
                &self.session.text,
                self.session.config.words_per_minute,
                &mut |message: String| sink.status(message),
                cancel,
            );
        }

        if cancel.is_cancelled() {
            return SessionOutcome::Cancelled;
        }

        // ── Completing ───────────────────────────────────────────────────
        sink.state(SessionState::Completing);
        sink.status("Typing completed successfully");
        SessionOutcome::Completed
    }

    /// Move to the target, optionally force focus, then click twice.
    ///
    /// Stops before the next pointer action once `cancel` is set.
    fn position(
        &self,
        backend: &mut dyn InputBackend,
        sleeper: &mut dyn Sleeper,
    ) -> Result<(), InjectError> {
        let (x, y) = self.session.target;
        let cancel = &self.session.cancel;
        let t = &self.timings;

        backend.move_pointer(x, y, ms(t.pointer_move_ms))?;

        if self.session.config.use_window_focus {
            match backend.focus_window_at(x, y) {
                Ok(focused) => log::debug!("session: focus at ({x}, {y}) -> {focused}"),
                Err(e) => log::warn!("session: focus at ({x}, {y}) failed: {e}"),
            }
            sleeper.sleep(ms(t.focus_settle_ms), cancel);
            if cancel.is_cancelled() {
                return Ok(());
            }
        }

        // Focus changes can nudge the pointer; land on the target again.
        backend.move_pointer(x, y, ms(t.pointer_move_ms))?;
        if cancel.is_cancelled() {
            return Ok(());
        }

        backend.click()?;
        sleeper.sleep(ms(t.click_settle_ms), cancel);
        if cancel.is_cancelled() {
            return Ok(());
        }
        backend.click()?;
        sleeper.sleep(ms(t.post_click_settle_ms), cancel);
        Ok(())
    }
}

/// Count down `secs` seconds, polling `cancel` every `countdown_poll_ms`.
/// Returns `false` if cancelled.
fn countdown(
    secs: u32,
    timings: &SessionTimings,
    sleeper: &mut dyn Sleeper,
    cancel: &CancellationToken,
    sink: &StatusSink,
) -> bool {
    let poll = ms(timings.countdown_poll_ms.max(1));

    for remaining in (1..=secs).rev() {
        if cancel.is_cancelled() {
            return false;
        }
        sink.status(format!("Starting in {remaining} seconds..."));

        let mut left = Duration::from_secs(1);
        while !left.is_zero() {
            if cancel.is_cancelled() {
                return false;
            }
            let slice = poll.min(left);
            sleeper.sleep(slice, cancel);
            left -= slice;
        }
    }

    !cancel.is_cancelled()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
