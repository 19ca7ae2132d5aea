//! Remote collaborator traits (ports)

pub mod identity_service;
pub mod profile_store;

pub use identity_service::IdentityService;
pub use profile_store::ProfileStore;
