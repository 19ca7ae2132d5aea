//! # Profile Core
//! 
//! Domain entities, validation rules, service ports and the profile
//! synchronization service.

pub mod domain;
pub mod validation;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{
    AuthErrorKind, CommittedStep, IdentityError, ProfileError, RemoteFailure, StoreError,
    ValidationFailure,
};
