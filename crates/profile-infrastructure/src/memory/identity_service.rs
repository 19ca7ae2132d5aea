//! In-memory identity provider

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use profile_core::repositories::IdentityService;
use profile_core::validation::{is_acceptable_password, is_valid_email};
use profile_core::{AuthErrorKind, IdentityError, UserId, UserIdentity};
use profile_security::PasswordService;
use profile_shared::utils::mask_email;

/// Calls that can be made to fail once via [`InMemoryIdentityService::fail_next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityOp {
    CreateAccount,
    SignIn,
    UpdateDisplayName,
    SignOut,
}

struct Account {
    identity: UserIdentity,
    password_hash: String,
}

/// Accounts keyed by lowercased email. Passwords are stored as Argon2 hashes.
#[derive(Default)]
pub struct InMemoryIdentityService {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<UserIdentity>>,
    failures: Mutex<HashMap<IdentityOp, IdentityError>>,
}

impl InMemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next call of kind `op` returns `error` instead of running.
    pub fn fail_next(&self, op: IdentityOp, error: IdentityError) {
        self.failures.lock().insert(op, error);
    }

    /// Stored identity record for `email`, independent of who is signed in.
    pub fn account(&self, email: &str) -> Option<UserIdentity> {
        self.accounts
            .read()
            .get(&email.to_lowercase())
            .map(|account| account.identity.clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn take_failure(&self, op: IdentityOp) -> Result<(), IdentityError> {
        match self.failures.lock().remove(&op) {
            Some(error) => {
                warn!("Injected {:?} failure: {}", op, error.code);
                Err(error)
            }
            None => Ok(()),
        }
    }
}

async fn hash_password(password: &str) -> Result<String, IdentityError> {
    let password_owned = password.to_string();
    tokio::task::spawn_blocking(move || PasswordService::hash(&password_owned))
        .await
        .map_err(|e| IdentityError::new(AuthErrorKind::Other, e.to_string()))?
        .map_err(|e| IdentityError::new(AuthErrorKind::Other, e.to_string()))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, IdentityError> {
    let password_owned = password.to_string();
    let stored_hash = hash.to_string();
    tokio::task::spawn_blocking(move || PasswordService::verify(&password_owned, &stored_hash))
        .await
        .map_err(|e| IdentityError::new(AuthErrorKind::Other, e.to_string()))?
        .map_err(|e| IdentityError::new(AuthErrorKind::Other, e.to_string()))
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn create_account(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
        self.take_failure(IdentityOp::CreateAccount)?;

        if !is_valid_email(email) {
            return Err(IdentityError::new(AuthErrorKind::InvalidEmail, "Email is badly formatted"));
        }
        if !is_acceptable_password(password) {
            return Err(IdentityError::new(
                AuthErrorKind::WeakPassword,
                "Password should be at least 6 characters",
            ));
        }

        let key = email.to_lowercase();
        if self.accounts.read().contains_key(&key) {
            return Err(IdentityError::new(
                AuthErrorKind::EmailAlreadyInUse,
                "Email is already in use by another account",
            ));
        }

        let password_hash = hash_password(password).await?;
        let identity = UserIdentity::new(UserId::new(Uuid::new_v4().to_string()), email);

        {
            let mut accounts = self.accounts.write();
            // Re-checked under the write lock, another registration may have won the race.
            if accounts.contains_key(&key) {
                return Err(IdentityError::new(
                    AuthErrorKind::EmailAlreadyInUse,
                    "Email is already in use by another account",
                ));
            }
            accounts.insert(
                key,
                Account {
                    identity: identity.clone(),
                    password_hash,
                },
            );
        }
        *self.current.write() = Some(identity.clone());

        info!("Account created: {} ({})", mask_email(email), identity.id);
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
        self.take_failure(IdentityOp::SignIn)?;

        let found = self
            .accounts
            .read()
            .get(&email.to_lowercase())
            .map(|account| (account.identity.clone(), account.password_hash.clone()));

        let Some((identity, password_hash)) = found else {
            debug!("Sign-in for unknown account: {}", mask_email(email));
            return Err(IdentityError::new(AuthErrorKind::InvalidCredential, "Invalid credential"));
        };

        if !verify_password(password, &password_hash).await? {
            debug!("Wrong password for: {}", mask_email(email));
            return Err(IdentityError::new(AuthErrorKind::InvalidCredential, "Invalid credential"));
        }

        *self.current.write() = Some(identity.clone());
        info!("Signed in: {}", mask_email(email));
        Ok(identity)
    }

    async fn update_display_name(&self, identity: &UserIdentity, name: &str) -> Result<(), IdentityError> {
        self.take_failure(IdentityOp::UpdateDisplayName)?;

        let updated = {
            let mut accounts = self.accounts.write();
            match accounts.get_mut(&identity.email.to_lowercase()) {
                Some(account) if account.identity.id == identity.id => {
                    account.identity.display_name = Some(name.to_string());
                    account.identity.clone()
                }
                _ => {
                    return Err(IdentityError::from_code(
                        "auth/user-not-found",
                        "No account for this identity",
                    ))
                }
            }
        };

        let mut current = self.current.write();
        if current.as_ref().map(|c| &c.id) == Some(&updated.id) {
            *current = Some(updated);
        }

        debug!("Display name updated for {}", identity.id);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.take_failure(IdentityOp::SignOut)?;
        *self.current.write() = None;
        info!("Signed out");
        Ok(())
    }

    fn current_identity(&self) -> Option<UserIdentity> {
        self.current.read().clone()
    }
}
