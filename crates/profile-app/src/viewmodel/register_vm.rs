//! Register ViewModel
//!
//! Registration form state with live password strength.

use tokio::sync::mpsc;
use tracing::warn;

use profile_core::validation::{validate_registration, PasswordStrength};
use profile_core::{AuthErrorKind, ProfileError, RegistrationForm, Theme};

use crate::context::SharedSync;
use crate::events::AppEvent;

pub struct RegisterViewModel {
    pub form: RegistrationForm,
    pub error: Option<String>,
    pub is_loading: bool,
    pub show_password: bool,
    sync: SharedSync,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl RegisterViewModel {
    pub fn new(sync: SharedSync, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            form: RegistrationForm::default(),
            error: None,
            is_loading: false,
            show_password: false,
            sync,
            event_tx,
        }
    }

    pub fn strength(&self) -> PasswordStrength {
        self.form.password_strength()
    }

    /// Fill level of the strength bar, 0.0 to 1.0
    pub fn strength_ratio(&self) -> f32 {
        PasswordStrength::fill_ratio(self.form.password_score())
    }

    /// Submits the form. The new profile document starts with `active_theme`.
    pub fn register(&mut self, active_theme: Theme) {
        if self.is_loading {
            return;
        }

        if let Err(failure) = validate_registration(&self.form) {
            self.error = Some(failure.to_string());
            return;
        }

        self.error = None;
        self.is_loading = true;

        let form = self.form.clone();
        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match sync.register(&form, active_theme).await {
                Ok(identity) => {
                    let _ = tx.send(AppEvent::RegisterSuccess(identity));
                }
                Err(e) => {
                    warn!("Registration failed: {}", e);
                    let _ = tx.send(AppEvent::RegisterFailed(failure_message(&e)));
                }
            }
        });
    }

    pub fn on_register_success(&mut self) {
        self.is_loading = false;
        self.form.clear();
    }

    pub fn on_register_failed(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
    }
}

/// Message shown for a failed registration
pub fn failure_message(error: &ProfileError) -> String {
    if let Some(failure) = error.validation() {
        return failure.to_string();
    }
    error
        .auth_kind()
        .unwrap_or(AuthErrorKind::Other)
        .user_message()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_core::{CommittedStep, IdentityError, StoreError, ValidationFailure};

    #[test]
    fn test_failure_message_table() {
        let err: ProfileError = IdentityError::from_code("auth/email-already-in-use", "taken").into();
        assert_eq!(failure_message(&err), "This email is already in use.");

        let err: ProfileError = IdentityError::from_code("auth/network-request-failed", "offline").into();
        assert_eq!(failure_message(&err), "Connection error. Check your internet.");

        let err: ProfileError = ValidationFailure::PasswordMismatch.into();
        assert_eq!(failure_message(&err), "Passwords do not match");
    }

    #[test]
    fn test_partial_write_gets_generic_message() {
        let err = ProfileError::PartialWrite {
            committed: CommittedStep::AccountCreated,
            pending: None,
            source: StoreError::Unavailable("offline".into()).into(),
        };
        assert_eq!(failure_message(&err), "Error creating account. Please try again.");
    }
}
