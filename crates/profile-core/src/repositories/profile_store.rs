//! Profile document store trait (port)

use async_trait::async_trait;

use crate::domain::{ProfilePatch, UserId, UserProfile};
use crate::error::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;
    /// Writes the whole document, replacing any existing one.
    async fn create(&self, id: &UserId, profile: &UserProfile) -> Result<(), StoreError>;
    /// Writes only the fields present in `patch`. Fails with `NotFound` when
    /// there is no document for `id`.
    async fn update(&self, id: &UserId, patch: &ProfilePatch) -> Result<(), StoreError>;
}
