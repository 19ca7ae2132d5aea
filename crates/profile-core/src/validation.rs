// ============================================================================
// Profile Core - Input Validation
// File: crates/profile-core/src/validation.rs
// ============================================================================
//! Pure checks applied before any profile or account mutation is submitted.
//!
//! Every function here is total and deterministic. Nothing in this module
//! talks to a remote service.

use once_cell::sync::Lazy;
use regex::Regex;

use profile_shared::constants::{
    MAX_BIO_LENGTH, MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_PHONE_DIGITS,
};
use profile_shared::utils::truncate_chars;

use crate::domain::{ProfileForm, RegistrationForm};
use crate::error::ValidationFailure;

pub use profile_security::{password_strength_score, PasswordStrength};

static PHONE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9\s()+\-]+$").expect("phone pattern is a valid regex")
});

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LENGTH
}

/// Phone is optional: blank input is valid.
pub fn is_valid_phone(phone: &str) -> bool {
    if phone.trim().is_empty() {
        return true;
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    PHONE_CHARS.is_match(phone) && digits >= MIN_PHONE_DIGITS
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

pub fn is_acceptable_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Input-stage cap for the bio field.
pub fn truncate_bio(bio: &str) -> String {
    truncate_chars(bio, MAX_BIO_LENGTH)
}

/// Checks run by the edit-profile save, in order. Bio is never rejected here.
pub fn validate_profile_edit(form: &ProfileForm) -> Result<(), ValidationFailure> {
    if form.name.trim().is_empty() {
        return Err(ValidationFailure::NameRequired);
    }
    if !is_valid_name(&form.name) {
        return Err(ValidationFailure::NameTooShort);
    }
    if !form.phone.is_empty() && !is_valid_phone(&form.phone) {
        return Err(ValidationFailure::InvalidPhone);
    }
    Ok(())
}

/// Checks run before an account is created, in order.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationFailure> {
    let any_blank = [&form.name, &form.email, &form.password, &form.confirmation]
        .iter()
        .any(|field| field.trim().is_empty());
    if any_blank {
        return Err(ValidationFailure::MissingFields);
    }
    if !is_valid_name(&form.name) {
        return Err(ValidationFailure::NameTooShort);
    }
    if !is_valid_email(&form.email) {
        return Err(ValidationFailure::InvalidEmail);
    }
    if !is_acceptable_password(&form.password) {
        return Err(ValidationFailure::PasswordTooShort);
    }
    if form.password != form.confirmation {
        return Err(ValidationFailure::PasswordMismatch);
    }
    Ok(())
}
