//! Typing sessions: validation, countdown, positioning, typing, cancellation.
//!
//! | Type                  | Thread  | Role                                      |
//! |-----------------------|---------|-------------------------------------------|
//! | [`SessionController`] | UI      | start / stop / poll, owns the one session |
//! | [`Worker`]            | worker  | countdown → positioning → typing          |
//! | [`WindowControl`]     | both    | minimise / restore / focus the UI window  |
//!
//! Worker → UI traffic is a FIFO of [`SessionEvent`]s.  The UI calls
//! [`SessionController::poll`] every frame and never blocks on the worker.

pub mod controller;
pub mod state;
pub mod worker;

#[cfg(test)]
pub mod testing;

pub use controller::{QuitDecision, SessionController};
pub use state::{
    Session, SessionEvent, SessionOutcome, SessionRequest, SessionState, TypingConfig,
};
pub use worker::{StatusSink, Worker};

// ---------------------------------------------------------------------------
// WindowControl
// ---------------------------------------------------------------------------

/// Window effects the worker needs while the UI owns the window.
///
/// Implementations must be callable from any thread.
pub trait WindowControl: Send + Sync {
    fn minimize(&self);
    /// Un-minimise and show the window.
    fn restore(&self);
    /// Raise the window above others and give it focus.
    fn bring_to_front(&self);
    /// Ask the UI to redraw soon.
    fn request_repaint(&self);
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Reasons a start request is refused.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A typing session is already running")]
    AlreadyRunning,

    #[error("Please set a typing position first")]
    NoTargetPosition,

    #[error("Please enter some text to type")]
    EmptyText,

    #[error("Typing speed must be a positive number of words per minute (got {0})")]
    InvalidSpeed(f64),

    #[error("Failed to start the typing thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl SessionError {
    /// Title for the modal that shows this error.
    pub fn title(&self) -> &'static str {
        match self {
            SessionError::AlreadyRunning => "Busy",
            SessionError::NoTargetPosition => "No Position",
            SessionError::EmptyText => "No Text",
            SessionError::InvalidSpeed(_) => "Invalid Speed",
            SessionError::Spawn(_) => "Error",
        }
    }
}
