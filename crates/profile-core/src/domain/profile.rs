// ============================================================================
// Profile Core - Profile Document
// File: crates/profile-core/src/domain/profile.rs
// Description: Per-user profile document and partial updates against it
// ============================================================================

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use profile_shared::utils::non_empty_trimmed;

use crate::validation::{is_valid_name, is_valid_phone};

/// Color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Theme name that is neither `light` nor `dark`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "tema", default)]
    pub theme: Theme,
    #[serde(rename = "notificacoes", default = "default_notifications")]
    pub notifications: bool,
}

fn default_notifications() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            notifications: default_notifications(),
        }
    }
}

/// Profile document, stored under the identity id.
///
/// Serialized field names are the document keys used by the store; absent
/// phone/bio are written as `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    #[serde(rename = "nome")]
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    /// Copy of the identity email taken at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "telefone", default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(max = 200, message = "Bio must have at most 200 characters"))]
    pub bio: Option<String>,

    #[serde(rename = "preferencias", default)]
    pub preferences: Preferences,

    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "dataAtualizacao", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("name_too_short"))
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

impl UserProfile {
    /// Document written once, right after the account is created.
    pub fn new(
        name: String,
        email: String,
        theme: Theme,
    ) -> Result<Self, validator::ValidationErrors> {
        let profile = Self {
            name: name.trim().to_string(),
            email: Some(email),
            phone: None,
            bio: None,
            preferences: Preferences {
                theme,
                notifications: true,
            },
            created_at: Utc::now(),
            updated_at: None,
        };

        profile.validate()?;
        Ok(profile)
    }
}

/// Partial update of a profile document.
///
/// `None` leaves a field untouched. For the nullable fields `Some(None)` writes
/// the null marker. Preference fields are nested keys and never replace the
/// whole `preferencias` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfilePatch {
    /// Fields written by the edit-profile save. Inputs are trimmed; blank phone
    /// or bio become the null marker.
    pub fn profile_edit(name: &str, phone: &str, bio: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.trim().to_string()),
            phone: Some(non_empty_trimmed(phone)),
            bio: Some(non_empty_trimmed(bio)),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn notifications(enabled: bool) -> Self {
        Self {
            notifications: Some(enabled),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Document paths this patch writes, nested keys in dotted form.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.name.is_some() {
            paths.push("nome");
        }
        if self.phone.is_some() {
            paths.push("telefone");
        }
        if self.bio.is_some() {
            paths.push("bio");
        }
        if self.theme.is_some() {
            paths.push("preferencias.tema");
        }
        if self.notifications.is_some() {
            paths.push("preferencias.notificacoes");
        }
        if self.updated_at.is_some() {
            paths.push("dataAtualizacao");
        }
        paths
    }

    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = phone.clone();
        }
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(theme) = self.theme {
            profile.preferences.theme = theme;
        }
        if let Some(enabled) = self.notifications {
            profile.preferences.notifications = enabled;
        }
        if let Some(updated_at) = self.updated_at {
            profile.updated_at = Some(updated_at);
        }
    }
}
