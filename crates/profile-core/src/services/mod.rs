//! Domain services (business logic)

pub mod profile_sync;

pub use profile_sync::ProfileSync;
