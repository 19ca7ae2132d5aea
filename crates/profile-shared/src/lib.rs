//! # Profile Shared
//! 
//! Configuration, telemetry, constants and small helpers shared by the profile crates.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::AppError;
