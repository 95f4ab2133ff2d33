//! Placeholder login screen.
//!
//! The credential check happens entirely on the client against a fixed
//! pair. It keeps casual users out of the dashboard and nothing more.

use crate::app::Route;
use crate::status::StatusMessage;
use egui::TextEdit;
use std::time::{Duration, Instant};

const EXPECTED_USERNAME: &str = "Admin";
const EXPECTED_PASSWORD: &str = "Admin@123";

/// How long the success message stays up before switching to the dashboard.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Checking,
    Granted { at: Instant },
    Denied,
}

#[derive(Clone, Debug)]
pub struct LoginGate {
    pub username: String,
    pub password: String,
    state: LoginState,
    message: Option<StatusMessage>,
}

impl Default for LoginGate {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            state: LoginState::Idle,
            message: None,
        }
    }
}

impl LoginGate {
    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn submit(&mut self, now: Instant) {
        if matches!(self.state, LoginState::Granted { .. }) {
            return;
        }
        self.state = LoginState::Checking;
        let username = self.username.trim();
        let password = self.password.trim();
        if username == EXPECTED_USERNAME && password == EXPECTED_PASSWORD {
            log::info!("login accepted for '{}'", username);
            self.state = LoginState::Granted { at: now };
            self.message = Some(StatusMessage::success("Login successful!"));
        } else {
            log::warn!("login rejected for '{}'", username);
            self.state = LoginState::Denied;
            self.message = Some(StatusMessage::error("Invalid username or password."));
        }
    }

    /// The route to switch to once the redirect delay has passed.
    pub fn poll(&self, now: Instant) -> Option<Route> {
        match self.state {
            LoginState::Granted { at } if now.duration_since(at) >= REDIRECT_DELAY => {
                Some(Route::Dashboard)
            }
            _ => None,
        }
    }

    /// Time until the redirect is due, if one is pending.
    pub fn pending_redirect(&self, now: Instant) -> Option<Duration> {
        match self.state {
            LoginState::Granted { at } => Some((at + REDIRECT_DELAY).saturating_duration_since(now)),
            _ => None,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.heading("Sign in");
            ui.add_space(10.0);
            let user = ui.add(
                TextEdit::singleline(&mut self.username)
                    .hint_text("Username")
                    .desired_width(240.0),
            );
            let pass = ui.add(
                TextEdit::singleline(&mut self.password)
                    .password(true)
                    .hint_text("Password")
                    .desired_width(240.0),
            );
            let enter = (user.lost_focus() || pass.lost_focus())
                && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Login").clicked() || enter {
                self.submit(Instant::now());
            }
            if let Some(message) = &self.message {
                message.show(ui);
            }
        });
    }
}
