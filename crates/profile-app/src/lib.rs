//! # Profile App
//!
//! Screen state for registration, sign-in, profile and edit-profile, wired to
//! the profile synchronization service.

pub mod app;
pub mod context;
pub mod events;
pub mod route;
pub mod viewmodel;

pub use app::App;
pub use context::{bootstrap, AppContext, SharedSync};
pub use events::AppEvent;
pub use route::{Navigator, Route};
