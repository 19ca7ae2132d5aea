//! # Profile Infrastructure
//! 
//! Identity provider and profile store implementations (adapters).

pub mod database;
pub mod memory;

pub use database::{create_pool, PgProfileStore};
pub use memory::{IdentityOp, InMemoryIdentityService, InMemoryProfileStore, StoreOp};
