//! Identity provider trait (port)

use async_trait::async_trait;

use crate::domain::UserIdentity;
use crate::error::IdentityError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates the account and signs it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError>;
    async fn update_display_name(&self, identity: &UserIdentity, name: &str) -> Result<(), IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
    /// Currently authenticated identity, if any.
    fn current_identity(&self) -> Option<UserIdentity>;
}
