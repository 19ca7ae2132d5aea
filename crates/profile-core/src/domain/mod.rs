//! # Profile Core - Domain Module
//! 
//! Identity record, profile document and the editable forms built from them.

pub mod identity;
pub mod profile;
pub mod form;

pub use identity::{UserId, UserIdentity};
pub use profile::{Preferences, ProfilePatch, Theme, UnknownTheme, UserProfile};
pub use form::{ProfileForm, ProfileOverview, RegistrationForm, SavedProfile};
