//! Configuration module for auto-type.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the platform config directory, and TOML loading via
//! `AppConfig::load`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AuthConfig, SessionTimings, TypingDefaults, UiConfig};
