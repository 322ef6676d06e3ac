//! Application entry point: auto-type.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults when absent).
//! 3. Create a small [`tokio`] runtime for the access check.
//! 4. Detect elevation for the window title.
//! 5. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use auto_type::{
    app::{window_title, AutoTypeApp},
    config::AppConfig,
    platform,
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig, title: &str) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title(title)
        .with_inner_size([width, height])
        .with_min_inner_size([800.0, 600.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("auto-type starting up");

    if !cfg!(windows) {
        log::warn!("auto-type targets Windows; window focusing and elevation checks are disabled");
    }

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (one worker is plenty for a single HTTP request)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Elevation
    let elevated = platform::is_elevated();
    if elevated {
        log::info!("running elevated");
    }
    let title = window_title(elevated);

    // 5. Run the UI (blocks until the window is closed)
    let options = native_options(&config, &title);
    let handle = rt.handle().clone();

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(AutoTypeApp::new(cc, config, handle, elevated)))),
    )
}
