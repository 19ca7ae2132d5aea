//! Login ViewModel

use tokio::sync::mpsc;
use tracing::warn;

use profile_core::{AuthErrorKind, IdentityError, ValidationFailure};
use profile_shared::utils::mask_email;

use super::SIGN_IN_FAILED_MESSAGE;
use crate::context::SharedSync;
use crate::events::AppEvent;

pub struct LoginViewModel {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub is_loading: bool,
    pub show_password: bool,
    sync: SharedSync,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl LoginViewModel {
    pub fn new(sync: SharedSync, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            email: String::with_capacity(100),
            password: String::with_capacity(100),
            error: None,
            is_loading: false,
            show_password: false,
            sync,
            event_tx,
        }
    }

    /// Attempt login - non-blocking async
    pub fn login(&mut self) {
        if self.is_loading {
            return;
        }

        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some(ValidationFailure::MissingFields.to_string());
            return;
        }

        self.error = None;
        self.is_loading = true;

        let email = self.email.trim().to_string();
        let password = self.password.clone();
        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match sync.identity_service().sign_in(&email, &password).await {
                Ok(identity) => {
                    let _ = tx.send(AppEvent::LoginSuccess(identity));
                }
                Err(e) => {
                    warn!("Sign-in failed for {}: {}", mask_email(&email), e);
                    let _ = tx.send(AppEvent::LoginFailed(sign_in_message(&e).to_string()));
                }
            }
        });
    }

    pub fn on_login_success(&mut self) {
        self.is_loading = false;
        self.error = None;
        self.password.clear();
        self.password.shrink_to_fit();
    }

    pub fn on_login_failed(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
    }

    pub fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
        self.error = None;
        self.is_loading = false;
    }
}

fn sign_in_message(error: &IdentityError) -> &'static str {
    match error.kind {
        AuthErrorKind::InvalidCredential
        | AuthErrorKind::InvalidEmail
        | AuthErrorKind::NetworkRequestFailed => error.kind.user_message(),
        _ => SIGN_IN_FAILED_MESSAGE,
    }
}
