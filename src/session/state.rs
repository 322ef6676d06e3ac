//! Session state machine, per-session data and worker → UI events.
//!
//! ```text
//! Idle ──start──▶ Validating ──ok──▶ Countdown ──▶ Positioning ──▶ Typing ──▶ Completing ──▶ Idle
//!                     └──rejected──▶ Idle
//! Countdown / Positioning / Typing ──stop──▶ Cancelling ──worker exits──▶ Idle
//! ```

use crate::config::TypingDefaults;
use crate::typing::CancellationToken;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the controller is in a session's life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session; Start is available.
    #[default]
    Idle,
    /// Checking the start request.
    Validating,
    /// Waiting out the countdown.
    Countdown,
    /// Minimising the UI, moving the pointer, focusing and clicking.
    Positioning,
    /// The scheduler is emitting text.
    Typing,
    /// Typing finished; restoring the UI.
    Completing,
    /// Stop was requested; waiting for the worker to exit.
    Cancelling,
}

impl SessionState {
    /// `true` while a worker may be running.
    ///
    /// ```
    /// use auto_type::session::SessionState;
    ///
    /// assert!(!SessionState::Idle.is_busy());
    /// assert!(!SessionState::Validating.is_busy());
    /// assert!(SessionState::Typing.is_busy());
    /// assert!(SessionState::Cancelling.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Validating)
    }

    /// Whether `stop()` may move this state to `Cancelling`.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            SessionState::Countdown | SessionState::Positioning | SessionState::Typing
        )
    }

    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Ready",
            SessionState::Validating => "Checking",
            SessionState::Countdown => "Countdown",
            SessionState::Positioning => "Positioning",
            SessionState::Typing => "Typing",
            SessionState::Completing => "Finishing",
            SessionState::Cancelling => "Stopping",
        }
    }
}

// ---------------------------------------------------------------------------
// TypingConfig
// ---------------------------------------------------------------------------

/// Per-session typing settings collected from the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingConfig {
    /// Typing speed; must be positive and finite.
    pub words_per_minute: f64,
    /// Jitter and punctuation pauses.
    pub humanize: bool,
    /// Seconds to wait before positioning.
    pub countdown_secs: u32,
    /// Force the window under the target to the foreground.
    pub use_window_focus: bool,
}

impl TypingConfig {
    pub fn from_defaults(defaults: &TypingDefaults) -> Self {
        Self {
            words_per_minute: defaults.words_per_minute,
            humanize: defaults.humanize,
            countdown_secs: defaults.countdown_secs,
            use_window_focus: defaults.use_window_focus,
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self::from_defaults(&TypingDefaults::default())
    }
}

// ---------------------------------------------------------------------------
// SessionRequest / Session
// ---------------------------------------------------------------------------

/// Everything the UI hands to [`super::SessionController::start`].
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub text: String,
    pub target: Option<(i32, i32)>,
    pub config: TypingConfig,
}

/// A validated, running session.
#[derive(Debug, Clone)]
pub struct Session {
    pub text: String,
    pub config: TypingConfig,
    pub target: (i32, i32),
    pub cancel: CancellationToken,
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

/// Events delivered to the UI in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The worker entered a new state.
    State(SessionState),
    /// Human-readable progress text.
    Status(String),
    /// The session is over.
    Finished(SessionOutcome),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn only_running_states_can_cancel() {
        let cancellable = [
            SessionState::Countdown,
            SessionState::Positioning,
            SessionState::Typing,
        ];
        let others = [
            SessionState::Idle,
            SessionState::Validating,
            SessionState::Completing,
            SessionState::Cancelling,
        ];
        assert!(cancellable.iter().all(SessionState::can_cancel));
        assert!(!others.iter().any(SessionState::can_cancel));
    }

    #[test]
    fn labels() {
        assert_eq!(SessionState::Idle.label(), "Ready");
        assert_eq!(SessionState::Cancelling.label(), "Stopping");
    }

    #[test]
    fn typing_config_follows_defaults() {
        let cfg = TypingConfig::default();
        assert_eq!(cfg.words_per_minute, 80.0);
        assert_eq!(cfg.countdown_secs, 5);
        assert!(cfg.humanize);
        assert!(cfg.use_window_focus);
    }
}
