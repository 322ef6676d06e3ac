//! Human-like inter-step delays.
//!
//! ```text
//! base   = 60 / (6 × wpm)                       seconds per character
//! delay  = base × U(0.7, 1.2) + class jitter     (humanize on)
//! delay  = base                                  (humanize off)
//! delay  = max(delay, 0.005)
//! ```
//!
//! Delays too large for a [`Duration`] (absurdly low WPM) saturate to
//! [`Duration::MAX`].
//!
//! Control characters are paced from `2 × base`.  A "word" is taken as six
//! characters rather than the usual five, which makes the typed output run
//! slightly faster than the nominal WPM.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

/// Characters per word used to convert WPM into a per-character delay.
pub const CHARS_PER_WORD: f64 = 6.0;

/// No delay is ever shorter than this, in seconds.
pub const MIN_DELAY_SECS: f64 = 0.005;

/// Multiplicative jitter applied to the base delay.
const JITTER: Range<f64> = 0.7..1.2;

/// Seconds per character for `words_per_minute` (> 0).
///
/// ```
/// use auto_type::typing::base_delay;
///
/// assert!((base_delay(60.0) - 1.0 / 6.0).abs() < 1e-12);
/// ```
pub fn base_delay(words_per_minute: f64) -> f64 {
    let chars_per_second = words_per_minute * CHARS_PER_WORD / 60.0;
    1.0 / chars_per_second
}

// ---------------------------------------------------------------------------
// CharClass
// ---------------------------------------------------------------------------

/// Pause class of the last character of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Space or tab.
    Whitespace,
    /// `, . ; : - — ? ! )`
    Punctuation,
    /// `\n`
    Newline,
    Other,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        match c {
            ' ' | '\t' => CharClass::Whitespace,
            ',' | '.' | ';' | ':' | '-' | '—' | '?' | '!' | ')' => CharClass::Punctuation,
            '\n' => CharClass::Newline,
            _ => CharClass::Other,
        }
    }

    /// Extra pause range in seconds, if any.
    fn extra(self) -> Option<Range<f64>> {
        match self {
            CharClass::Whitespace => Some(0.01..0.05),
            CharClass::Punctuation => Some(0.03..0.12),
            CharClass::Newline => Some(0.05..0.15),
            CharClass::Other => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DelayModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct DelayModel {
    pub humanize: bool,
}

impl DelayModel {
    pub fn new(humanize: bool) -> Self {
        Self { humanize }
    }

    /// Delay following a step whose pace is `base` seconds and whose last
    /// character has class `class`.
    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R, base: f64, class: CharClass) -> Duration {
        let secs = if self.humanize {
            let mut secs = base * rng.gen_range(JITTER);
            if let Some(extra) = class.extra() {
                secs += rng.gen_range(extra);
            }
            secs
        } else {
            base
        };
        Duration::try_from_secs_f64(secs.max(MIN_DELAY_SECS)).unwrap_or(Duration::MAX)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
