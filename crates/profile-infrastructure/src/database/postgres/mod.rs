//! PostgreSQL implementations

pub mod profile_store_impl;

pub use profile_store_impl::PgProfileStore;
