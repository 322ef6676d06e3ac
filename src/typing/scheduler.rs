//! The typing scheduler: steps → injection calls → pauses.
//!
//! [`TypingScheduler::emit`] walks the text left to right.  Before every
//! step it polls the [`CancellationToken`]; after every step it sleeps for a
//! delay drawn from the [`DelayModel`].  A failed injection call is reported,
//! the position advances by one character and the scheduler backs off
//! before continuing.  Nothing that was already typed is undone on
//! cancellation.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TypingDefaults;
use crate::inject::InputBackend;

use super::cancel::{CancellationToken, Sleeper};
use super::delay::{base_delay, CharClass, DelayModel};
use super::plan::{next_step, Step};

/// Status reported when emission stops because of cancellation.
pub const STATUS_STOPPED: &str = "Typing stopped";
/// Status reported after the last step.
pub const STATUS_COMPLETE: &str = "Typing complete";

/// Progress is reported whenever the position enters a new block of this
/// many characters.
const PROGRESS_BLOCK: usize = 10;

// ---------------------------------------------------------------------------
// SchedulerOptions
// ---------------------------------------------------------------------------

/// Tuning knobs for one [`TypingScheduler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerOptions {
    /// Maximum ordinary characters per injection call.
    pub batch_size: usize,
    /// Minimum interval between keys inside a batch.
    pub key_interval: Duration,
    /// Pause after a failed injection call.
    pub error_backoff: Duration,
    /// Apply jitter and class pauses.
    pub humanize: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from(&TypingDefaults::default())
    }
}

impl From<&TypingDefaults> for SchedulerOptions {
    fn from(defaults: &TypingDefaults) -> Self {
        Self {
            batch_size: defaults.batch_size,
            key_interval: Duration::from_millis(defaults.key_interval_ms),
            error_backoff: Duration::from_millis(defaults.error_backoff_ms),
            humanize: defaults.humanize,
        }
    }
}

// ---------------------------------------------------------------------------
// TypingScheduler
// ---------------------------------------------------------------------------

/// Emits text through an [`InputBackend`] with human-like pacing.
pub struct TypingScheduler<'a> {
    backend: &'a mut dyn InputBackend,
    sleeper: &'a mut dyn Sleeper,
    options: SchedulerOptions,
    delays: DelayModel,
    rng: StdRng,
}

impl<'a> TypingScheduler<'a> {
    /// Scheduler with an entropy-seeded RNG.
    pub fn new(
        backend: &'a mut dyn InputBackend,
        sleeper: &'a mut dyn Sleeper,
        options: SchedulerOptions,
    ) -> Self {
        Self::with_rng(backend, sleeper, options, StdRng::from_entropy())
    }

    /// Scheduler with a deterministic RNG.
    pub fn with_seed(
        backend: &'a mut dyn InputBackend,
        sleeper: &'a mut dyn Sleeper,
        options: SchedulerOptions,
        seed: u64,
    ) -> Self {
        Self::with_rng(backend, sleeper, options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        backend: &'a mut dyn InputBackend,
        sleeper: &'a mut dyn Sleeper,
        options: SchedulerOptions,
        rng: StdRng,
    ) -> Self {
        Self {
            backend,
            sleeper,
            delays: DelayModel::new(options.humanize),
            options,
            rng,
        }
    }

    /// Type `text` at `words_per_minute` (must be > 0; validated by the
    /// caller).
    ///
    /// Progress and errors go to `status`.  Completion is signalled only by
    /// [`STATUS_COMPLETE`]; a cancelled run ends with [`STATUS_STOPPED`]
    /// instead.  Empty text returns immediately without any status.
    pub fn emit(
        &mut self,
        text: &str,
        words_per_minute: f64,
        status: &mut dyn FnMut(String),
        cancel: &CancellationToken,
    ) {
        if text.is_empty() {
            return;
        }
        if cancel.is_cancelled() {
            status(STATUS_STOPPED.into());
            return;
        }

        let base = base_delay(words_per_minute);
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        log::debug!(
            "typing: {total} chars at {words_per_minute} wpm (base {:.4}s)",
            base
        );

        let mut i = 0;
        let mut reported_block = None;

        while i < total {
            if cancel.is_cancelled() {
                log::info!("typing: cancelled at position {i}/{total}");
                status(STATUS_STOPPED.into());
                return;
            }

            let block = i / PROGRESS_BLOCK;
            if reported_block != Some(block) {
                reported_block = Some(block);
                status(format!("Typing character {}/{}", i + 1, total));
            }

            let (step, len) = next_step(&chars, i, self.options.batch_size);

            match self.send(&step, base) {
                Ok(delay) => {
                    i += len;
                    self.sleeper.sleep(delay, cancel);
                }
                Err(e) => {
                    log::warn!("typing: step at position {i} failed: {e}");
                    status(format!("Error typing at position {i}: {e}"));
                    i += 1;
                    self.sleeper.sleep(self.options.error_backoff, cancel);
                }
            }
        }

        if cancel.is_cancelled() {
            status(STATUS_STOPPED.into());
        } else {
            status(STATUS_COMPLETE.into());
        }
    }

    /// Inject one step and pick the pause that follows it.
    fn send(&mut self, step: &Step, base: f64) -> Result<Duration, crate::inject::InjectError> {
        let class = step.last_char().map_or(CharClass::Other, CharClass::of);
        match step {
            Step::Control(_) => {
                if let Some(key) = step.key() {
                    self.backend.press_key(key)?;
                }
                Ok(self.delays.delay(&mut self.rng, base * 2.0, class))
            }
            Step::Batch(chunk) => {
                self.backend.type_chars(chunk, self.options.key_interval)?;
                Ok(self.delays.delay(&mut self.rng, base, class))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
