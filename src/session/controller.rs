//! [`SessionController`]: owns the single active session.
//!
//! The controller lives on the UI thread.  It validates start requests,
//! spawns the `typing-session` worker, forwards cancellation and turns the
//! worker's channel traffic into [`SessionEvent`]s for the UI.  It is driven
//! by calling [`poll`](SessionController::poll) once per frame.
//!
//! # Cancellation
//!
//! [`stop`](SessionController::stop) sets the session's token and returns at
//! once.  If the worker is still alive after `cancel_grace_ms`, the next poll
//! performs a forced interrupt: held buttons/keys are released and the
//! pointer jumps to the top-right corner.  This does not abort an OS call
//! already in flight, it only gives a stuck injection nothing to act on.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::SessionTimings;
use crate::inject::InputDriver;
use crate::typing::{CancellationToken, SchedulerOptions, ThreadSleeper, STATUS_STOPPED};

use super::state::{
    Session, SessionEvent, SessionOutcome, SessionRequest, SessionState,
};
use super::worker::{StatusSink, Worker};
use super::{SessionError, WindowControl};

/// What the UI should do with a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    /// Nothing is running; close now.
    Close,
    /// A session is running; ask the user first.
    Confirm,
}

/// Bookkeeping for the running worker.
struct ActiveSession {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    stop_requested_at: Option<Instant>,
    interrupted: bool,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

pub struct SessionController {
    driver: Arc<dyn InputDriver>,
    window: Arc<dyn WindowControl>,
    options: SchedulerOptions,
    timings: SessionTimings,
    state: SessionState,
    active: Option<ActiveSession>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    last_status: String,
}

impl SessionController {
    pub fn new(
        driver: Arc<dyn InputDriver>,
        window: Arc<dyn WindowControl>,
        options: SchedulerOptions,
        timings: SessionTimings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            driver,
            window,
            options,
            timings,
            state: SessionState::Idle,
            active: None,
            events_tx,
            events_rx,
            last_status: "Ready".into(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Most recent status line.
    pub fn last_status(&self) -> &str {
        &self.last_status
    }

    // -----------------------------------------------------------------------
    // Start / stop
    // -----------------------------------------------------------------------

    /// Run the checks [`start`](Self::start) would run, without starting.
    pub fn check(&self, request: &SessionRequest) -> Result<(), SessionError> {
        if self.active.is_some() || self.state.is_busy() {
            return Err(SessionError::AlreadyRunning);
        }
        validate(request.clone()).map(|_| ())
    }

    /// Validate `request` and spawn the worker.
    ///
    /// On error nothing is spawned and the state stays `Idle`.
    pub fn start(&mut self, request: SessionRequest) -> Result<(), SessionError> {
        if self.active.is_some() || self.state.is_busy() {
            return Err(SessionError::AlreadyRunning);
        }

        self.state = SessionState::Validating;
        let session = match validate(request) {
            Ok(session) => session,
            Err(e) => {
                self.state = SessionState::Idle;
                log::info!("session: rejected start: {e}");
                return Err(e);
            }
        };

        let cancel = session.cancel.clone();
        let mut options = self.options;
        options.humanize = session.config.humanize;

        let worker = Worker {
            session,
            options,
            timings: self.timings.clone(),
            driver: Arc::clone(&self.driver),
            window: Arc::clone(&self.window),
            sink: StatusSink::new(self.events_tx.clone(), Arc::clone(&self.window)),
        };

        let spawned = std::thread::Builder::new()
            .name("typing-session".into())
            .spawn(move || worker.run(&mut ThreadSleeper::new()));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.state = SessionState::Idle;
                log::error!("session: failed to spawn worker: {e}");
                return Err(SessionError::Spawn(e));
            }
        };

        log::info!("session: started");
        self.active = Some(ActiveSession {
            cancel,
            handle,
            stop_requested_at: None,
            interrupted: false,
        });
        self.state = SessionState::Countdown;
        Ok(())
    }

    /// Request cancellation of the running session.
    ///
    /// Returns `false` (and does nothing) when there is nothing to cancel.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !self.state.can_cancel() {
            return false;
        }

        log::info!("session: stop requested in {:?}", self.state);
        active.cancel.cancel();
        active.stop_requested_at = Some(Instant::now());
        self.state = SessionState::Cancelling;
        self.last_status = "Stopping typing process...".into();
        self.window.bring_to_front();
        true
    }

    // -----------------------------------------------------------------------
    // Quit
    // -----------------------------------------------------------------------

    pub fn request_quit(&self) -> QuitDecision {
        if self.active.is_some() {
            QuitDecision::Confirm
        } else {
            QuitDecision::Close
        }
    }

    /// The user confirmed quitting: cancel whatever is running.
    pub fn confirm_quit(&mut self) {
        if let Some(active) = &self.active {
            log::info!("session: quitting with an active session");
            active.cancel.cancel();
        }
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Drain worker events, escalate a slow stop and reap a finished worker.
    ///
    /// Call once per frame.  Returned events are in emission order.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        // Checked before draining so every event of a finished worker is
        // already queued when we reap it.
        let finished = self
            .active
            .as_ref()
            .is_some_and(|active| active.handle.is_finished());

        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(&event);
            events.push(event);
        }

        if finished {
            if let Some(event) = self.reap() {
                self.apply(&event);
                events.push(event);
            }
        } else if self.grace_expired() {
            self.force_interrupt();
        }

        events
    }

    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::State(state) => {
                // A stop outranks whatever the worker reports afterwards.
                if self.state != SessionState::Cancelling {
                    self.state = *state;
                }
            }
            SessionEvent::Status(message) => self.last_status = message.clone(),
            SessionEvent::Finished(_) => {}
        }
    }

    /// Join the worker.  A panic becomes a synthetic `Failed` outcome.
    fn reap(&mut self) -> Option<SessionEvent> {
        let active = self.active.take()?;
        self.state = SessionState::Idle;

        match active.handle.join() {
            Ok(()) => None,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                log::error!("session: worker panicked: {reason}");
                // Unwinding already ran the worker's guard; restore again in
                // case the panic happened before it was armed.
                self.window.restore();
                self.last_status = format!("Error: {reason}");
                Some(SessionEvent::Finished(SessionOutcome::Failed(reason)))
            }
        }
    }

    fn grace_expired(&self) -> bool {
        let grace = Duration::from_millis(self.timings.cancel_grace_ms);
        self.active.as_ref().is_some_and(|active| {
            !active.interrupted
                && active
                    .stop_requested_at
                    .is_some_and(|at| at.elapsed() >= grace)
        })
    }

    /// Release held input and park the pointer in the top-right corner.
    fn force_interrupt(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.interrupted = true;
        }
        log::warn!("session: worker still running after stop, forcing interrupt");

        let result = self.driver.connect().and_then(|mut backend| {
            backend.release_all()?;
            let (width, _) = backend.screen_size()?;
            backend.move_pointer(width - 1, 0, Duration::ZERO)
        });
        if let Err(e) = result {
            log::warn!("session: forced interrupt incomplete: {e}");
        }
        self.last_status = STATUS_STOPPED.into();
    }
}

/// Checks run while in `Validating`, in order.
fn validate(request: SessionRequest) -> Result<Session, SessionError> {
    let target = request.target.ok_or(SessionError::NoTargetPosition)?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(SessionError::EmptyText);
    }

    let wpm = request.config.words_per_minute;
    if !wpm.is_finite() || wpm <= 0.0 {
        return Err(SessionError::InvalidSpeed(wpm));
    }

    Ok(Session {
        text: text.to_string(),
        config: request.config,
        target,
        cancel: CancellationToken::new(),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("typing worker crashed: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("typing worker crashed: {s}")
    } else {
        "typing worker crashed".into()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
