//! Password strength heuristic shown while the user types a new password.
//!
//! One point each for: at least 6 characters, at least 8 characters, an
//! uppercase ASCII letter, a lowercase ASCII letter, an ASCII digit, and any
//! character outside `[A-Za-z0-9]`.

use serde::{Deserialize, Serialize};

use profile_shared::constants::{MAX_PASSWORD_SCORE, MIN_PASSWORD_LENGTH, STRONG_PASSWORD_LENGTH};

pub fn password_strength_score(password: &str) -> u8 {
    let length = password.chars().count();
    let checks = [
        length >= MIN_PASSWORD_LENGTH,
        length >= STRONG_PASSWORD_LENGTH,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => PasswordStrength::VeryWeak,
            1..=2 => PasswordStrength::Weak,
            3..=4 => PasswordStrength::Medium,
            _ => PasswordStrength::Strong,
        }
    }

    pub fn evaluate(password: &str) -> Self {
        Self::from_score(password_strength_score(password))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "very weak",
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }

    /// Share of the strength bar to fill, in `[0.0, 1.0]`.
    pub fn fill_ratio(score: u8) -> f32 {
        f32::from(score.min(MAX_PASSWORD_SCORE)) / f32::from(MAX_PASSWORD_SCORE)
    }
}
