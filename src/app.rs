//! auto-type window: egui/eframe application.
//!
//! # Architecture
//!
//! [`AutoTypeApp`] is the top-level [`eframe::App`].  It shows a login
//! screen until the [`AccessGate`] accepts a password, then the main screen.
//! Everything slow happens elsewhere:
//!
//! * the access check runs on the tokio runtime and answers over a oneshot;
//! * typing runs on the `typing-session` thread owned by [`SessionController`];
//! * position picking runs on the `position-picker` rdev thread.
//!
//! Each frame drains all three without blocking.
//!
//! # Screens
//!
//! | Screen | Contents |
//! |--------|----------|
//! | `Login` | masked password, Enter submits, Escape quits |
//! | `Main`  | position, text, speed, focus toggle, Start / Stop / Quit, status bar |

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::oneshot;

use crate::auth::{AccessGate, AuthError, HttpAccessSource};
use crate::config::AppConfig;
use crate::inject::{DesktopDriver, InputDriver};
use crate::picker::{self, PickEvent, PositionPicker};
use crate::session::{
    QuitDecision, SessionController, SessionEvent, SessionOutcome, SessionRequest, SessionState,
    TypingConfig, WindowControl,
};
use crate::typing::SchedulerOptions;

/// Base window title.
pub const APP_TITLE: &str = "Auto Type - Windows Edition";

/// Title shown in the header and the OS title bar.
///
/// ```
/// use auto_type::app::window_title;
///
/// assert_eq!(window_title(false), "Auto Type - Windows Edition");
/// assert_eq!(window_title(true), "Auto Type - Windows Edition (Admin)");
/// ```
pub fn window_title(elevated: bool) -> String {
    if elevated {
        format!("{APP_TITLE} (Admin)")
    } else {
        APP_TITLE.to_string()
    }
}

/// Steps shown under the header of the main screen.
const INSTRUCTIONS: &str = "1. Click 'Set Position' and then click anywhere on screen to select typing position\n\
                            2. Enter text and set typing speed (WPM)\n\
                            3. Click 'Start Typing' to begin";

/// Notice shown before a session starts.
fn ready_message(countdown_secs: u32) -> String {
    format!(
        "The app will minimize while typing.\n\
         Typing will begin after a {countdown_secs} second countdown.\n\n\
         DO NOT close the app until typing is complete."
    )
}

fn format_position(target: Option<(i32, i32)>) -> String {
    match target {
        Some((x, y)) => format!("({x}, {y})"),
        None => "Not set".into(),
    }
}

// ---------------------------------------------------------------------------
// ViewportWindow: WindowControl over egui viewport commands
// ---------------------------------------------------------------------------

/// Window effects sent through egui's (thread-safe) viewport command queue.
#[derive(Clone)]
pub struct ViewportWindow(pub egui::Context);

impl WindowControl for ViewportWindow {
    fn minimize(&self) {
        self.0
            .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
        self.0.request_repaint();
    }

    fn restore(&self) {
        self.0
            .send_viewport_cmd(egui::ViewportCommand::Minimized(false));
        self.0.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        self.0.request_repaint();
    }

    fn bring_to_front(&self) {
        self.0
            .send_viewport_cmd(egui::ViewportCommand::Minimized(false));
        self.0.send_viewport_cmd(egui::ViewportCommand::Focus);
        self.0.request_repaint();
    }

    fn request_repaint(&self) {
        self.0.request_repaint();
    }
}

// ---------------------------------------------------------------------------
// UI-side state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Main,
}

/// A message box; at most one is shown at a time.
#[derive(Debug, Clone)]
struct Modal {
    title: String,
    message: String,
}

#[derive(Default)]
struct LoginState {
    password: String,
    message: Option<String>,
    pending: Option<oneshot::Receiver<Result<bool, AuthError>>>,
}

// ---------------------------------------------------------------------------
// AutoTypeApp
// ---------------------------------------------------------------------------

pub struct AutoTypeApp {
    screen: Screen,
    login: LoginState,
    gate: Arc<AccessGate<HttpAccessSource>>,
    runtime: tokio::runtime::Handle,

    // ── Session ──────────────────────────────────────────────────────────
    controller: SessionController,
    driver: Arc<dyn InputDriver>,
    picker: PositionPicker,
    target: Option<(i32, i32)>,
    text: String,
    typing: TypingConfig,

    // ── UI state ─────────────────────────────────────────────────────────
    status: String,
    modal: Option<Modal>,
    /// Validated request waiting for the "Ready to Type" acknowledgement.
    ready: Option<SessionRequest>,
    confirm_quit: bool,
    allow_close: bool,
    elevated: bool,
    elevation_notice_pending: bool,

    config: AppConfig,
}

impl AutoTypeApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        runtime: tokio::runtime::Handle,
        elevated: bool,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        let window: Arc<dyn WindowControl> = Arc::new(ViewportWindow(ctx.clone()));
        let driver: Arc<dyn InputDriver> = Arc::new(DesktopDriver);

        let controller = SessionController::new(
            Arc::clone(&driver),
            window,
            SchedulerOptions::from(&config.typing),
            config.session.clone(),
        );

        let repaint = ctx.clone();
        let picker = PositionPicker::new(move || repaint.request_repaint());

        Self {
            screen: Screen::Login,
            login: LoginState::default(),
            gate: Arc::new(AccessGate::new(HttpAccessSource::from_config(&config.auth))),
            runtime,
            controller,
            driver,
            picker,
            target: None,
            text: String::new(),
            typing: TypingConfig::from_defaults(&config.typing),
            status: "Ready".into(),
            modal: None,
            ready: None,
            confirm_quit: false,
            allow_close: false,
            elevated,
            elevation_notice_pending: cfg!(windows) && !elevated,
            config,
        }
    }

    fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.modal = Some(Modal {
            title: title.into(),
            message: message.into(),
        });
    }

    // ── Login ────────────────────────────────────────────────────────────

    fn submit_password(&mut self, ctx: &egui::Context) {
        if self.login.pending.is_some() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        let gate = Arc::clone(&self.gate);
        let password = self.login.password.clone();
        let repaint = ctx.clone();

        self.runtime.spawn(async move {
            let _ = tx.send(gate.verify(&password).await);
            repaint.request_repaint();
        });

        self.login.pending = Some(rx);
        self.login.message = Some("Verifying password...".into());
    }

    fn poll_login(&mut self) {
        let Some(rx) = self.login.pending.as_mut() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(AuthError::Request("verification task ended".into()))
            }
        };
        self.login.pending = None;

        match result {
            Ok(true) => {
                log::info!("login accepted");
                self.login = LoginState::default();
                self.screen = Screen::Main;
            }
            Ok(false) => {
                self.login.password.clear();
                self.login.message = Some("Invalid password. Please try again.".into());
            }
            Err(e) => {
                log::warn!("access check failed: {e}");
                self.login.password.clear();
                self.login.message = Some("Invalid password. Please try again.".into());
                self.show_error("Authentication Error", e.to_string());
            }
        }
    }

    fn draw_login(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let verifying = self.login.pending.is_some();

        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.heading("Authentication Required");
            ui.add_space(12.0);
            ui.label("Please enter the application password:");
            ui.add_space(8.0);

            let field = ui.add_enabled(
                !verifying,
                egui::TextEdit::singleline(&mut self.login.password)
                    .password(true)
                    .desired_width(300.0),
            );
            if !verifying && !field.has_focus() && self.modal.is_none() {
                field.request_focus();
            }
            let entered = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.add_space(12.0);
            let mut login = false;
            let mut cancel = false;
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 180.0).max(0.0) / 2.0);
                login = ui
                    .add_enabled(!verifying, egui::Button::new("Login").min_size([80.0, 0.0].into()))
                    .clicked();
                cancel = ui
                    .add(egui::Button::new("Cancel").min_size([80.0, 0.0].into()))
                    .clicked();
            });

            if let Some(message) = &self.login.message {
                ui.add_space(8.0);
                ui.label(message.as_str());
            }

            if (entered || login) && !verifying {
                self.submit_password(ctx);
            }
            if cancel {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        if self.modal.is_none() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    // ── Position picking ─────────────────────────────────────────────────

    fn toggle_picker(&mut self) {
        if self.picker.disarm() {
            self.status = "Position selection cancelled".into();
            return;
        }

        let origin = picker::current_pointer(self.driver.as_ref());
        match self.picker.arm(origin) {
            Ok(()) => {
                self.status =
                    "Click anywhere on screen to set position... (Esc to cancel)".into();
            }
            Err(e) => {
                log::error!("failed to start position picker: {e}");
                self.show_error("Error", format!("Could not start position selection: {e}"));
            }
        }
    }

    fn poll_picker(&mut self) {
        while let Some(event) = self.picker.poll() {
            match event {
                PickEvent::Picked { x, y } => {
                    self.target = Some((x, y));
                    self.status = format!("Position set successfully at ({x}, {y})");
                }
                PickEvent::Cancelled => {
                    self.status = "Position selection cancelled".into();
                    if let Some(origin) = self.picker.origin() {
                        if let Err(e) = picker::restore_pointer(self.driver.as_ref(), origin) {
                            log::warn!("could not restore pointer: {e}");
                        }
                    }
                }
            }
        }
    }

    // ── Session ──────────────────────────────────────────────────────────

    /// Validate, then ask for the "Ready to Type" acknowledgement.
    fn request_start(&mut self) {
        let request = SessionRequest {
            text: self.text.clone(),
            target: self.target,
            config: self.typing,
        };
        match self.controller.check(&request) {
            Ok(()) => self.ready = Some(request),
            Err(e) => self.show_error(e.title(), e.to_string()),
        }
    }

    fn start_typing(&mut self, request: SessionRequest) {
        match self.controller.start(request) {
            Ok(()) => self.status = "Preparing to type...".into(),
            Err(e) => self.show_error(e.title(), e.to_string()),
        }
    }

    fn draw_ready_notice(&mut self, ctx: &egui::Context) {
        let Some(request) = &self.ready else {
            return;
        };
        let message = ready_message(request.config.countdown_secs);
        let mut answer = None;
        egui::Window::new("Ready to Type")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let ok = ui.button("OK").clicked();
                    let cancel = ui.button("Cancel").clicked();
                    if ok || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        answer = Some(true);
                    } else if cancel || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        answer = Some(false);
                    }
                });
            });

        match answer {
            Some(true) => {
                if let Some(request) = self.ready.take() {
                    self.start_typing(request);
                }
            }
            Some(false) => self.ready = None,
            None => {}
        }
    }

    fn poll_session(&mut self) {
        for event in self.controller.poll() {
            match event {
                SessionEvent::Status(message) => self.status = message,
                SessionEvent::State(_) => {}
                SessionEvent::Finished(SessionOutcome::Failed(reason)) => {
                    self.status = format!("Error: {reason}");
                    self.show_error("Error", format!("An error occurred during typing: {reason}"));
                }
                SessionEvent::Finished(_) => {}
            }
        }
        // Stop sets the status synchronously.
        if self.controller.state() == SessionState::Cancelling {
            self.status = self.controller.last_status().to_string();
        }
    }

    // ── Quit ─────────────────────────────────────────────────────────────

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.allow_close {
            return;
        }
        match self.controller.request_quit() {
            QuitDecision::Close => self.allow_close = true,
            QuitDecision::Confirm => {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.confirm_quit = true;
            }
        }
    }

    fn draw_quit_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_quit {
            return;
        }
        let mut answer = None;
        egui::Window::new("Confirm Exit")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Typing is in progress. Are you sure you want to quit?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        answer = Some(false);
                    }
                });
            });

        match answer {
            Some(true) => {
                self.confirm_quit = false;
                self.controller.confirm_quit();
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Some(false) => self.confirm_quit = false,
            None => {}
        }
    }

    // ── Main screen ──────────────────────────────────────────────────────

    fn draw_main(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let running = self.controller.is_running();

        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new(window_title(self.elevated)).size(24.0).strong());
        });
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(INSTRUCTIONS);
        });
        ui.separator();

        // Position
        ui.horizontal(|ui| {
            ui.label("Typing Position:");
            ui.label(egui::RichText::new(format_position(self.target)).monospace());
            let caption = if self.picker.is_armed() {
                "Cancel Selection"
            } else {
                "Set Position"
            };
            if ui.add_enabled(!running, egui::Button::new(caption)).clicked() {
                self.toggle_picker();
            }
        });
        ui.add_space(6.0);

        // Settings
        ui.horizontal(|ui| {
            ui.label("Typing Speed:");
            ui.add_enabled(
                !running,
                egui::Slider::new(
                    &mut self.typing.words_per_minute,
                    self.config.ui.min_wpm..=self.config.ui.max_wpm,
                )
                .step_by(1.0)
                .suffix(" WPM"),
            );
            ui.separator();
            ui.add_enabled(
                !running,
                egui::Checkbox::new(&mut self.typing.use_window_focus, "Use Windows Focus"),
            );
            ui.add_enabled(
                !running,
                egui::Checkbox::new(&mut self.typing.humanize, "Human-like timing"),
            );
            ui.add_enabled(
                !running,
                egui::DragValue::new(&mut self.typing.countdown_secs)
                    .range(0..=30)
                    .suffix(" s countdown"),
            );
        });
        ui.add_space(6.0);

        // Buttons
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    !running && self.ready.is_none(),
                    egui::Button::new("Start Typing"),
                )
                .clicked()
            {
                self.request_start();
            }
            if ui
                .add_enabled(
                    self.controller.state().can_cancel(),
                    egui::Button::new("Stop"),
                )
                .clicked()
            {
                self.controller.stop();
                self.status = self.controller.last_status().to_string();
            }
            if ui.button("Quit").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
        ui.add_space(6.0);

        // Text
        ui.label("Text to Type:");
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add_enabled(
                !running,
                egui::TextEdit::multiline(&mut self.text)
                    .desired_width(f32::INFINITY)
                    .desired_rows(18)
                    .hint_text("Paste the text to type here"),
            );
        });
    }

    fn draw_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Status: {}", self.status));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.controller.state().label());
                });
            });
        });
    }

    fn draw_modal(&mut self, ctx: &egui::Context) {
        let Some(modal) = &self.modal else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(modal.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(modal.message.as_str());
                ui.add_space(8.0);
                dismissed = ui.button("OK").clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Enter));
            });
        if dismissed {
            self.modal = None;
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for AutoTypeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll non-blocking sources --------------------------------------
        self.poll_login();
        self.poll_picker();
        self.poll_session();

        if self.screen == Screen::Main && self.elevation_notice_pending && self.modal.is_none() {
            self.elevation_notice_pending = false;
            self.show_error(
                "Administrator Mode",
                "Not running as administrator. Some applications that run as \
                 administrator may not receive the typed text.",
            );
        }

        // --- Keep polling while something runs in the background ----------
        if self.controller.is_running() || self.picker.is_armed() || self.login.pending.is_some()
        {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.handle_close_request(ctx);

        // --- Render -------------------------------------------------------
        self.draw_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Login => self.draw_login(ui, ctx),
            Screen::Main => self.draw_main(ui, ctx),
        });

        self.draw_ready_notice(ctx);
        self.draw_quit_confirmation(ctx);
        self.draw_modal(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.confirm_quit();
        log::info!("auto-type closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
