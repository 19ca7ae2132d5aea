//! In-process adapters.
//!
//! Used for local runs and tests. Each adapter can be told to fail its next
//! call of a given kind, to exercise the partial-write paths.

pub mod identity_service;
pub mod profile_store;

pub use identity_service::{IdentityOp, InMemoryIdentityService};
pub use profile_store::{InMemoryProfileStore, StoreOp};
