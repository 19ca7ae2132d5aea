//! Domain errors
//!
//! Three failure families: input rule violations caught locally, rejected or
//! unreachable remote calls, and partial writes where the first of two remote
//! updates committed and the second did not.

use std::fmt;

use thiserror::Error;

use crate::domain::{ProfilePatch, UserId};

/// Input-rule violation. Never sent to a remote service.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Name is required")]
    NameRequired,

    #[error("Name must have at least 2 characters")]
    NameTooShort,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Please enter a valid email")]
    InvalidEmail,

    #[error("Password must have at least 6 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Failure categories reported by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    NetworkRequestFailed,
    InvalidCredential,
    Other,
}

impl AuthErrorKind {
    /// Provider error codes. Anything unrecognized is `Other`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorKind::EmailAlreadyInUse,
            "auth/invalid-email" => AuthErrorKind::InvalidEmail,
            "auth/weak-password" => AuthErrorKind::WeakPassword,
            "auth/network-request-failed" => AuthErrorKind::NetworkRequestFailed,
            "auth/invalid-credential" => AuthErrorKind::InvalidCredential,
            _ => AuthErrorKind::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthErrorKind::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorKind::InvalidEmail => "auth/invalid-email",
            AuthErrorKind::WeakPassword => "auth/weak-password",
            AuthErrorKind::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorKind::InvalidCredential => "auth/invalid-credential",
            AuthErrorKind::Other => "auth/internal-error",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::EmailAlreadyInUse => "This email is already in use.",
            AuthErrorKind::InvalidEmail => "Invalid email.",
            AuthErrorKind::WeakPassword => "The password is too weak.",
            AuthErrorKind::NetworkRequestFailed => "Connection error. Check your internet.",
            AuthErrorKind::InvalidCredential => "Incorrect email or password.",
            AuthErrorKind::Other => "Error creating account. Please try again.",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Identity provider error [{code}]: {message}")]
pub struct IdentityError {
    pub kind: AuthErrorKind,
    pub code: String,
    pub message: String,
}

impl IdentityError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            message: message.into(),
        }
    }

    /// Keeps the raw provider code even when it maps to `Other`.
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: AuthErrorKind::from_code(&code),
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Profile document not found: {0}")]
    NotFound(UserId),

    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid profile document: {0}")]
    InvalidDocument(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// A remote call was rejected or could not be made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Remote step that had already committed when a later step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommittedStep {
    /// Account created, display name and/or document missing
    AccountCreated,
    /// Display name updated, document not updated
    DisplayNameUpdated,
}

impl fmt::Display for CommittedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommittedStep::AccountCreated => f.write_str("account creation"),
            CommittedStep::DisplayNameUpdated => f.write_str("display name update"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Remote(#[from] RemoteFailure),

    /// Identity record and profile document now disagree. `pending` holds the
    /// document update that can be replayed, when there is one.
    #[error("Partial write after {committed}: {source}")]
    PartialWrite {
        committed: CommittedStep,
        pending: Option<ProfilePatch>,
        source: RemoteFailure,
    },
}

impl From<IdentityError> for ProfileError {
    fn from(e: IdentityError) -> Self {
        ProfileError::Remote(RemoteFailure::Identity(e))
    }
}

impl From<StoreError> for ProfileError {
    fn from(e: StoreError) -> Self {
        ProfileError::Remote(RemoteFailure::Store(e))
    }
}

impl ProfileError {
    pub fn validation(&self) -> Option<ValidationFailure> {
        match self {
            ProfileError::Validation(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_partial_write(&self) -> bool {
        matches!(self, ProfileError::PartialWrite { .. })
    }

    /// Provider category when the identity service rejected the first step.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            ProfileError::Remote(RemoteFailure::Identity(e)) => Some(e.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_round_trips_known_kinds() {
        let kinds = [
            AuthErrorKind::EmailAlreadyInUse,
            AuthErrorKind::InvalidEmail,
            AuthErrorKind::WeakPassword,
            AuthErrorKind::NetworkRequestFailed,
            AuthErrorKind::InvalidCredential,
        ];
        for kind in kinds {
            assert_eq!(AuthErrorKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn test_unknown_code_is_catch_all() {
        let err = IdentityError::from_code("auth/too-many-requests", "slow down");
        assert_eq!(err.kind, AuthErrorKind::Other);
        assert_eq!(err.code, "auth/too-many-requests");
        assert_eq!(err.kind.user_message(), "Error creating account. Please try again.");
    }

    #[test]
    fn test_conversions_into_profile_error() {
        let err: ProfileError = IdentityError::new(AuthErrorKind::WeakPassword, "weak").into();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::WeakPassword));
        assert!(!err.is_partial_write());

        let err: ProfileError = StoreError::Unavailable("offline".into()).into();
        assert_eq!(err.auth_kind(), None);
        assert_eq!(err.validation(), None);

        let err: ProfileError = ValidationFailure::InvalidPhone.into();
        assert_eq!(err.validation(), Some(ValidationFailure::InvalidPhone));
        assert_eq!(err.to_string(), "Invalid phone number");
    }

    #[test]
    fn test_partial_write_message() {
        let err = ProfileError::PartialWrite {
            committed: CommittedStep::DisplayNameUpdated,
            pending: None,
            source: StoreError::NotFound(UserId::new("uid-9")).into(),
        };
        assert!(err.is_partial_write());
        assert_eq!(
            err.to_string(),
            "Partial write after display name update: Profile document not found: uid-9"
        );
    }
}
