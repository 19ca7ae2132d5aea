//! # Profile Security
//! 
//! Password strength scoring and password hashing.

pub mod password;
pub mod strength;

pub use password::{PasswordError, PasswordService};
pub use strength::{password_strength_score, PasswordStrength};
