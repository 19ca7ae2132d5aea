//! ViewModel Module
//!
//! Screen state. Remote work runs on spawned tasks and reports back through
//! `AppEvent`s.

pub mod edit_profile_vm;
pub mod login_vm;
pub mod profile_vm;
pub mod register_vm;
pub mod theme_vm;

pub use edit_profile_vm::{EditProfileViewModel, PendingWrite};
pub use login_vm::LoginViewModel;
pub use profile_vm::ProfileViewModel;
pub use register_vm::RegisterViewModel;
pub use theme_vm::ThemeViewModel;

pub const LOAD_FAILED_MESSAGE: &str = "Could not load user data";
pub const SAVE_FAILED_MESSAGE: &str = "Could not update profile. Please try again.";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Could not sign in. Please try again.";
