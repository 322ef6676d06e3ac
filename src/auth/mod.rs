//! Remote access check shown before the main window.
//!
//! * [`AccessCodeSource`]: async trait returning the access payload.
//! * [`HttpAccessSource`]: GETs the payload from [`AuthConfig::access_url`].
//! * [`AccessGate`]: fetches, parses `{"access_code": "..."}` and compares.
//! * [`AuthError`]: every reason the check could not be completed.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use auto_type::auth::{AccessGate, HttpAccessSource};
//! use auto_type::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let gate = AccessGate::new(HttpAccessSource::from_config(&config.auth));
//!
//!     match gate.verify("hunter2").await {
//!         Ok(true) => println!("welcome"),
//!         Ok(false) => println!("Invalid password"),
//!         Err(e) => println!("Authentication Error: {e}"),
//!     }
//! }
//! ```
//!
//! [`AuthConfig::access_url`]: crate::config::AuthConfig::access_url

pub mod gate;
pub mod source;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use gate::{check_payload, AccessGate, ACCESS_CODE_KEY};
pub use source::{AccessCodeSource, AuthError, HttpAccessSource};
