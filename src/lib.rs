//! auto-type: types text into another application with human-like timing.
//!
//! * [`typing`]: the cancellable keystroke scheduler.
//! * [`session`]: countdown, positioning, typing and cancellation.
//! * [`inject`]: the OS input boundary (`enigo`).
//! * [`picker`]: picking the target point with a global click (`rdev`).
//! * [`auth`]: the remote access check.
//! * [`config`]: `settings.toml`.
//! * [`app`]: the eframe window.

pub mod app;
pub mod auth;
pub mod config;
pub mod inject;
pub mod picker;
pub mod platform;
pub mod session;
pub mod typing;
