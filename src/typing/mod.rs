//! Human-like typing: the core of auto-type.
//!
//! # Architecture
//!
//! ```text
//! text ──▶ plan::next_step ──▶ Step::Batch("abc") ──▶ InputBackend::type_chars
//!                         └──▶ Step::Control('\t') ──▶ InputBackend::press_key
//!                                        │
//!                                        ▼
//!                           DelayModel::delay ──▶ Sleeper::sleep
//!                                        │
//!                      CancellationToken polled before every step
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use auto_type::inject::{DesktopDriver, InputDriver};
//! use auto_type::typing::{CancellationToken, SchedulerOptions, ThreadSleeper, TypingScheduler};
//!
//! let mut backend = DesktopDriver.connect().unwrap();
//! let mut sleeper = ThreadSleeper::new();
//! let cancel = CancellationToken::new();
//!
//! let mut scheduler =
//!     TypingScheduler::new(backend.as_mut(), &mut sleeper, SchedulerOptions::default());
//! scheduler.emit("Hello,\tworld", 80.0, &mut |s| println!("{s}"), &cancel);
//! ```

pub mod cancel;
pub mod delay;
pub mod plan;
pub mod scheduler;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cancel::{CancellationToken, Sleeper, ThreadSleeper};
pub use delay::{base_delay, CharClass, DelayModel, MIN_DELAY_SECS};
pub use plan::{next_step, plan_steps, Step};
pub use scheduler::{SchedulerOptions, TypingScheduler, STATUS_COMPLETE, STATUS_STOPPED};
