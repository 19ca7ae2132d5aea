//! Editable form state and the read models built from remote records

use serde::Serialize;

use profile_shared::constants::{FALLBACK_AVATAR_INITIAL, FALLBACK_DISPLAY_NAME, MAX_BIO_LENGTH};

use super::identity::UserIdentity;
use super::profile::{ProfilePatch, Theme, UserProfile};
use crate::validation::{password_strength_score, truncate_bio, PasswordStrength};

/// Local values of the edit-profile screen.
///
/// Email comes from the identity record and cannot be edited. Bio is capped
/// at input time, so save never has to reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileForm {
    pub name: String,
    email: String,
    pub phone: String,
    bio: String,
}

impl ProfileForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: email.into(),
            phone: String::new(),
            bio: String::new(),
        }
    }

    /// Merge precedence: identity display name, then the document name. Email
    /// always comes from the identity.
    pub fn from_records(identity: &UserIdentity, document: Option<&UserProfile>) -> Self {
        let mut form = Self::new(identity.email.clone());
        match document {
            Some(doc) => {
                form.name = identity
                    .display_name()
                    .unwrap_or(doc.name.as_str())
                    .to_string();
                form.phone = doc.phone.clone().unwrap_or_default();
                form.set_bio(doc.bio.as_deref().unwrap_or_default());
            }
            None => {
                form.name = identity.display_name().unwrap_or_default().to_string();
            }
        }
        form
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn set_bio(&mut self, bio: &str) {
        self.bio = truncate_bio(bio);
    }

    /// Characters left for the bio counter.
    pub fn bio_remaining(&self) -> usize {
        MAX_BIO_LENGTH.saturating_sub(self.bio.chars().count())
    }
}

/// Local values of the registration screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

impl RegistrationForm {
    pub fn password_score(&self) -> u8 {
        password_strength_score(&self.password)
    }

    pub fn password_strength(&self) -> PasswordStrength {
        PasswordStrength::from_score(self.password_score())
    }

    /// `None` until the user starts typing the confirmation.
    pub fn passwords_match(&self) -> Option<bool> {
        if self.confirmation.is_empty() {
            None
        } else {
            Some(self.password == self.confirmation)
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Header and settings shown on the profile screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOverview {
    pub display_name: String,
    pub email: String,
    pub avatar_initial: char,
    pub notifications_enabled: bool,
    pub stored_theme: Option<Theme>,
}

impl ProfileOverview {
    pub fn from_records(identity: &UserIdentity, document: Option<&UserProfile>) -> Self {
        let avatar_initial = identity
            .display_name()
            .and_then(|name| name.chars().next())
            .or_else(|| identity.email.chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or(FALLBACK_AVATAR_INITIAL);

        Self {
            display_name: identity
                .display_name()
                .unwrap_or(FALLBACK_DISPLAY_NAME)
                .to_string(),
            email: identity.email.clone(),
            avatar_initial,
            notifications_enabled: document
                .map(|doc| doc.preferences.notifications)
                .unwrap_or(true),
            stored_theme: document.map(|doc| doc.preferences.theme),
        }
    }
}

/// Result of a successful edit-profile save. The caller returns to the
/// previous view when it receives this.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProfile {
    pub display_name: String,
    pub patch: ProfilePatch,
}
