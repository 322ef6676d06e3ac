//! Application settings structs, defaults and TOML loading.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a hand-written `settings.toml`
//! only needs the keys it overrides.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TypingDefaults
// ---------------------------------------------------------------------------

/// Initial values for the typing controls plus the scheduler's tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingDefaults {
    /// Initial position of the WPM slider.
    pub words_per_minute: f64,
    /// Apply per-batch jitter and punctuation pauses.
    pub humanize: bool,
    /// Seconds to wait before the pointer is moved and typing begins.
    pub countdown_secs: u32,
    /// Initial state of the "force window focus" checkbox.
    pub use_window_focus: bool,
    /// Maximum number of ordinary characters typed per injection call.
    pub batch_size: usize,
    /// Minimum interval between keys inside one batch, in milliseconds.
    pub key_interval_ms: u64,
    /// Pause after a failed injection call, in milliseconds.
    pub error_backoff_ms: u64,
}

impl Default for TypingDefaults {
    fn default() -> Self {
        Self {
            words_per_minute: 80.0,
            humanize: true,
            countdown_secs: 5,
            use_window_focus: true,
            batch_size: 3,
            key_interval_ms: 10,
            error_backoff_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionTimings
// ---------------------------------------------------------------------------

/// Settling delays used while the session positions the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTimings {
    /// Wait after minimising the window so the target is uncovered.
    pub minimize_settle_ms: u64,
    /// Duration of the smoothed pointer move to the target.
    pub pointer_move_ms: u64,
    /// Wait after forcing the target window to the foreground.
    pub focus_settle_ms: u64,
    /// Wait between the two confirmatory clicks.
    pub click_settle_ms: u64,
    /// Wait after the second click before the first keystroke.
    pub post_click_settle_ms: u64,
    /// Countdown cancellation poll interval.
    pub countdown_poll_ms: u64,
    /// How long `stop()` waits for the worker before forcing an interrupt.
    pub cancel_grace_ms: u64,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            minimize_settle_ms: 500,
            pointer_move_ms: 100,
            focus_settle_ms: 500,
            click_settle_ms: 300,
            post_click_settle_ms: 500,
            countdown_poll_ms: 250,
            cancel_grace_ms: 100,
        }
    }
}

impl SessionTimings {
    /// All delays zeroed; keeps controller tests fast.
    pub fn immediate() -> Self {
        Self {
            minimize_settle_ms: 0,
            pointer_move_ms: 0,
            focus_settle_ms: 0,
            click_settle_ms: 0,
            post_click_settle_ms: 0,
            countdown_poll_ms: 10,
            cancel_grace_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Where the access code is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// URL returning `{"access_code": "..."}`.
    pub access_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_url: "https://pastebin.com/raw/eKiZCNbX".into(),
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// eframe window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner size of the main window.
    pub window_size: (f32, f32),
    /// Keep the window above all others.
    pub always_on_top: bool,
    /// Lower bound of the WPM slider.
    pub min_wpm: f64,
    /// Upper bound of the WPM slider.
    pub max_wpm: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (900.0, 700.0),
            always_on_top: false,
            min_wpm: 20.0,
            max_wpm: 120.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, read from `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Typing control defaults and scheduler tuning.
    pub typing: TypingDefaults,
    /// Session settling delays.
    pub session: SessionTimings,
    /// Remote access check.
    pub auth: AuthConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write this configuration to `path`, creating parent directories.
    ///
    /// The application never calls this on its own; it exists so a
    /// starting `settings.toml` can be generated.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
