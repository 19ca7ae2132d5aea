// ============================================================================
// Profile Core - Profile Sync Service
// File: crates/profile-core/src/services/profile_sync.rs
// ============================================================================
//! Read-modify-write of the identity record and the profile document

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use profile_shared::utils::mask_email;

use crate::domain::{
    ProfileForm, ProfileOverview, ProfilePatch, RegistrationForm, SavedProfile, Theme,
    UserIdentity, UserProfile,
};
use crate::error::{CommittedStep, ProfileError, ValidationFailure};
use crate::repositories::{IdentityService, ProfileStore};
use crate::validation::{validate_profile_edit, validate_registration};

/// Profile synchronization against the identity provider and the document store.
///
/// Every operation takes the authenticated identity explicitly. Nothing is
/// retried automatically.
pub struct ProfileSync<I: IdentityService + ?Sized, S: ProfileStore + ?Sized> {
    identity: Arc<I>,
    store: Arc<S>,
}

impl<I: IdentityService + ?Sized, S: ProfileStore + ?Sized> ProfileSync<I, S> {
    pub fn new(identity: Arc<I>, store: Arc<S>) -> Self {
        Self { identity, store }
    }

    pub fn identity_service(&self) -> &Arc<I> {
        &self.identity
    }

    /// Editable form for the edit-profile screen
    pub async fn load(&self, identity: &UserIdentity) -> Result<ProfileForm, ProfileError> {
        let document = self.store.get(&identity.id).await.map_err(|e| {
            error!("Failed to load profile for {}: {}", identity.id, e);
            e
        })?;

        if document.is_none() {
            debug!("No profile document for {}, using identity only", identity.id);
        }
        Ok(ProfileForm::from_records(identity, document.as_ref()))
    }

    /// Header and settings for the profile screen
    pub async fn overview(&self, identity: &UserIdentity) -> Result<ProfileOverview, ProfileError> {
        let document = self.store.get(&identity.id).await?;
        Ok(ProfileOverview::from_records(identity, document.as_ref()))
    }

    /// Edit-profile save: display name first, document second.
    pub async fn save(
        &self,
        identity: &UserIdentity,
        form: &ProfileForm,
    ) -> Result<SavedProfile, ProfileError> {
        // 1. Validate locally, nothing leaves the device on failure
        if let Err(failure) = validate_profile_edit(form) {
            warn!("Profile save rejected for {}: {}", identity.id, failure);
            return Err(failure.into());
        }

        let display_name = form.name.trim().to_string();
        let patch = ProfilePatch::profile_edit(&form.name, &form.phone, form.bio(), Utc::now());

        // 2. Identity provider display name
        self.identity
            .update_display_name(identity, &display_name)
            .await
            .map_err(|e| {
                error!("Display name update failed for {}: {}", identity.id, e);
                e
            })?;

        // 3. Profile document
        if let Err(e) = self.store.update(&identity.id, &patch).await {
            error!(
                "Profile document update failed after display name update for {}: {}",
                identity.id, e
            );
            return Err(ProfileError::PartialWrite {
                committed: CommittedStep::DisplayNameUpdated,
                pending: Some(patch),
                source: e.into(),
            });
        }

        info!("Profile updated for {} ({:?})", identity.id, patch.field_paths());
        Ok(SavedProfile {
            display_name,
            patch,
        })
    }

    /// Replays the document step of a partial save. Never called automatically.
    pub async fn complete_partial_write(
        &self,
        identity: &UserIdentity,
        pending: &ProfilePatch,
    ) -> Result<(), ProfileError> {
        self.store.update(&identity.id, pending).await?;
        info!("Pending profile write completed for {}", identity.id);
        Ok(())
    }

    /// Creates the account, sets its display name, then writes the profile document.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        active_theme: Theme,
    ) -> Result<UserIdentity, ProfileError> {
        let masked = mask_email(&form.email);
        info!("Registration attempt for email: {}", masked);

        // 1. Validate, a failure here never reaches the identity provider
        if let Err(failure) = validate_registration(form) {
            warn!("Registration rejected for {}: {}", masked, failure);
            return Err(failure.into());
        }

        // 2. Build the document, still nothing written
        let profile = registration_document(form, active_theme)?;

        // 3. Create the account
        let mut identity = self
            .identity
            .create_account(&form.email, &form.password)
            .await
            .map_err(|e| {
                warn!("Account creation failed for {}: {}", masked, e);
                e
            })?;

        // 4. Display name
        let display_name = profile.name.clone();
        if let Err(e) = self.identity.update_display_name(&identity, &display_name).await {
            error!("Display name update failed for new account {}: {}", identity.id, e);
            return Err(ProfileError::PartialWrite {
                committed: CommittedStep::AccountCreated,
                pending: None,
                source: e.into(),
            });
        }
        identity.display_name = Some(display_name);

        // 5. Profile document
        if let Err(e) = self.store.create(&identity.id, &profile).await {
            error!("Profile document creation failed for {}: {}", identity.id, e);
            return Err(ProfileError::PartialWrite {
                committed: CommittedStep::AccountCreated,
                pending: None,
                source: e.into(),
            });
        }

        info!("Registration successful for: {}", masked);
        Ok(identity)
    }

    /// Touches only `preferencias.tema`.
    pub async fn update_theme(&self, identity: &UserIdentity, theme: Theme) -> Result<(), ProfileError> {
        self.store
            .update(&identity.id, &ProfilePatch::theme(theme))
            .await?;
        debug!("Theme preference set to {} for {}", theme.as_str(), identity.id);
        Ok(())
    }

    /// Touches only `preferencias.notificacoes`.
    pub async fn update_notifications(
        &self,
        identity: &UserIdentity,
        enabled: bool,
    ) -> Result<(), ProfileError> {
        self.store
            .update(&identity.id, &ProfilePatch::notifications(enabled))
            .await?;
        debug!("Notifications set to {} for {}", enabled, identity.id);
        Ok(())
    }

    /// Best effort, failures are only logged.
    pub async fn sign_out(&self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!("Sign out failed: {}", e);
        }
    }
}

/// Document written for a new account. Fails before anything remote is touched.
fn registration_document(form: &RegistrationForm, theme: Theme) -> Result<UserProfile, ProfileError> {
    UserProfile::new(form.name.clone(), form.email.clone(), theme).map_err(|e| {
        warn!("New profile document failed validation: {}", e);
        ProfileError::Validation(ValidationFailure::NameTooShort)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::error::{AuthErrorKind, IdentityError, RemoteFailure, StoreError};
    use crate::repositories::identity_service::MockIdentityService;
    use crate::repositories::profile_store::MockProfileStore;
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn identity() -> UserIdentity {
        UserIdentity {
            id: UserId::new("uid-1"),
            email: "ana@example.com".to_string(),
            display_name: Some("Ana".to_string()),
        }
    }

    fn edit_form(name: &str, phone: &str, bio: &str) -> ProfileForm {
        let mut form = ProfileForm::new("ana@example.com");
        form.name = name.to_string();
        form.phone = phone.to_string();
        form.set_bio(bio);
        form
    }

    fn registration(password: &str, confirmation: &str) -> RegistrationForm {
        RegistrationForm {
            name: " Ana Lima ".to_string(),
            email: "ana@example.com".to_string(),
            password: password.to_string(),
            confirmation: confirmation.to_string(),
        }
    }

    fn service(
        identity: MockIdentityService,
        store: MockProfileStore,
    ) -> ProfileSync<MockIdentityService, MockProfileStore> {
        ProfileSync::new(Arc::new(identity), Arc::new(store))
    }

    fn stored_profile() -> UserProfile {
        let mut profile =
            UserProfile::new("Ana Doc".to_string(), "ana@example.com".to_string(), Theme::Dark)
                .unwrap();
        profile.phone = Some("(85) 98888-7777".to_string());
        profile
    }

    #[tokio::test]
    async fn test_load_merges_identity_and_document() {
        let mut store = MockProfileStore::new();
        store
            .expect_get()
            .with(eq(UserId::new("uid-1")))
            .times(1)
            .returning(|_| Ok(Some(stored_profile())));

        let form = service(MockIdentityService::new(), store)
            .load(&identity())
            .await
            .unwrap();
        assert_eq!(form.name, "Ana");
        assert_eq!(form.phone, "(85) 98888-7777");
        assert_eq!(form.bio(), "");
    }

    #[tokio::test]
    async fn test_load_without_document_never_fails() {
        let mut store = MockProfileStore::new();
        store.expect_get().returning(|_| Ok(None));

        let form = service(MockIdentityService::new(), store)
            .load(&identity())
            .await
            .unwrap();
        assert_eq!(form.name, "Ana");
        assert_eq!(form.email(), "ana@example.com");
        assert_eq!(form.phone, "");
        assert_eq!(form.bio(), "");
    }

    #[tokio::test]
    async fn test_load_surfaces_store_failure() {
        let mut store = MockProfileStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Unavailable("offline".into())));

        let err = service(MockIdentityService::new(), store)
            .load(&identity())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Remote(RemoteFailure::Store(_))));
    }

    #[tokio::test]
    async fn test_save_with_empty_name_calls_no_remote() {
        let mut identity_service = MockIdentityService::new();
        identity_service.expect_update_display_name().never();
        let mut store = MockProfileStore::new();
        store.expect_update().never();

        let err = service(identity_service, store)
            .save(&identity(), &edit_form("   ", "", ""))
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(ValidationFailure::NameRequired));
    }

    #[tokio::test]
    async fn test_save_with_bad_phone_calls_no_remote() {
        let mut identity_service = MockIdentityService::new();
        identity_service.expect_update_display_name().never();
        let mut store = MockProfileStore::new();
        store.expect_update().never();

        let err = service(identity_service, store)
            .save(&identity(), &edit_form("Ana", "abc123", ""))
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(ValidationFailure::InvalidPhone));
    }

    #[tokio::test]
    async fn test_save_success_calls_each_remote_once() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_update_display_name()
            .withf(|_, name| name == "Ana Lima")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut store = MockProfileStore::new();
        store
            .expect_update()
            .withf(|id, patch| {
                id.as_str() == "uid-1"
                    && patch.name.as_deref() == Some("Ana Lima")
                    && patch.phone == Some(Some("(11) 99999-9999".to_string()))
                    && patch.bio == Some(None)
                    && patch.updated_at.is_some()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let saved = service(identity_service, store)
            .save(&identity(), &edit_form("  Ana Lima ", " (11) 99999-9999 ", "   "))
            .await
            .unwrap();
        assert_eq!(saved.display_name, "Ana Lima");
    }

    #[tokio::test]
    async fn test_save_empty_phone_persists_null_marker() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_update_display_name()
            .returning(|_, _| Ok(()));
        let mut store = MockProfileStore::new();
        store
            .expect_update()
            .withf(|_, patch| patch.phone == Some(None))
            .times(1)
            .returning(|_, _| Ok(()));

        let saved = service(identity_service, store)
            .save(&identity(), &edit_form("Ana", "", "Oi"))
            .await
            .unwrap();
        assert_eq!(saved.patch.phone, Some(None));
    }

    #[tokio::test]
    async fn test_save_identity_failure_skips_document() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_update_display_name()
            .times(1)
            .returning(|_, _| {
                Err(IdentityError::new(AuthErrorKind::NetworkRequestFailed, "offline"))
            });
        let mut store = MockProfileStore::new();
        store.expect_update().never();

        let err = service(identity_service, store)
            .save(&identity(), &edit_form("Ana", "", ""))
            .await
            .unwrap_err();
        assert!(!err.is_partial_write());
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::NetworkRequestFailed));
    }

    #[tokio::test]
    async fn test_save_document_failure_is_partial_write() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_update_display_name()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut store = MockProfileStore::new();
        store
            .expect_update()
            .times(1)
            .returning(|id, _| Err(StoreError::NotFound(id.clone())));

        let err = service(identity_service, store)
            .save(&identity(), &edit_form("Ana", "", ""))
            .await
            .unwrap_err();
        match err {
            ProfileError::PartialWrite {
                committed,
                pending,
                ..
            } => {
                assert_eq!(committed, CommittedStep::DisplayNameUpdated);
                assert_eq!(pending.and_then(|p| p.name), Some("Ana".to_string()));
            }
            other => panic!("expected partial write, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_twice_writes_same_fields() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_update_display_name()
            .times(2)
            .returning(|_, _| Ok(()));
        let written: Arc<Mutex<Vec<ProfilePatch>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&written);
        let mut store = MockProfileStore::new();
        store.expect_update().times(2).returning(move |_, patch| {
            sink.lock().unwrap().push(patch.clone());
            Ok(())
        });

        let sync = service(identity_service, store);
        let form = edit_form("Ana", "(85) 3333-4444 ", "Forró");
        sync.save(&identity(), &form).await.unwrap();
        sync.save(&identity(), &form).await.unwrap();

        let mut patches = written.lock().unwrap().clone();
        for patch in patches.iter_mut() {
            patch.updated_at = None;
        }
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0], patches[1]);
    }

    #[tokio::test]
    async fn test_complete_partial_write_replays_patch() {
        let pending = ProfilePatch::profile_edit("Ana", "", "", Utc::now());
        let expected = pending.clone();
        let mut store = MockProfileStore::new();
        store
            .expect_update()
            .withf(move |_, patch| *patch == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        service(MockIdentityService::new(), store)
            .complete_partial_write(&identity(), &pending)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_mismatch_never_creates_account() {
        let mut identity_service = MockIdentityService::new();
        identity_service.expect_create_account().never();
        let mut store = MockProfileStore::new();
        store.expect_create().never();

        let err = service(identity_service, store)
            .register(&registration("secret1", "secret2"), Theme::Light)
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(ValidationFailure::PasswordMismatch));
    }

    #[tokio::test]
    async fn test_register_creates_identity_then_document() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_create_account()
            .withf(|email, password| email == "ana@example.com" && password == "secret1")
            .times(1)
            .returning(|email, _| Ok(UserIdentity::new(UserId::new("uid-new"), email)));
        identity_service
            .expect_update_display_name()
            .withf(|identity, name| identity.id.as_str() == "uid-new" && name == "Ana Lima")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut store = MockProfileStore::new();
        store
            .expect_create()
            .withf(|id, profile| {
                id.as_str() == "uid-new"
                    && profile.name == "Ana Lima"
                    && profile.email.as_deref() == Some("ana@example.com")
                    && profile.preferences.theme == Theme::Dark
                    && profile.preferences.notifications
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let created = service(identity_service, store)
            .register(&registration("secret1", "secret1"), Theme::Dark)
            .await
            .unwrap();
        assert_eq!(created.display_name.as_deref(), Some("Ana Lima"));
    }

    #[test]
    fn test_registration_document_is_validated_locally() {
        let doc = registration_document(&registration("secret1", "secret1"), Theme::Light).unwrap();
        assert_eq!(doc.name, "Ana Lima");
        assert_eq!(doc.email.as_deref(), Some("ana@example.com"));
        assert_eq!(doc.preferences.theme, Theme::Light);

        let mut form = registration("secret1", "secret1");
        form.name = " A ".to_string();
        let err = registration_document(&form, Theme::Light).unwrap_err();
        assert_eq!(err.validation(), Some(ValidationFailure::NameTooShort));
        assert!(!err.is_partial_write());
    }

    #[tokio::test]
    async fn test_register_identity_failure_creates_no_document() {
        let mut identity_service = MockIdentityService::new();
        identity_service.expect_create_account().returning(|_, _| {
            Err(IdentityError::from_code("auth/email-already-in-use", "taken"))
        });
        identity_service.expect_update_display_name().never();
        let mut store = MockProfileStore::new();
        store.expect_create().never();

        let err = service(identity_service, store)
            .register(&registration("secret1", "secret1"), Theme::Light)
            .await
            .unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::EmailAlreadyInUse));
    }

    #[tokio::test]
    async fn test_register_document_failure_is_partial_write() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_create_account()
            .returning(|email, _| Ok(UserIdentity::new(UserId::new("uid-new"), email)));
        identity_service
            .expect_update_display_name()
            .returning(|_, _| Ok(()));
        let mut store = MockProfileStore::new();
        store
            .expect_create()
            .returning(|_, _| Err(StoreError::Unavailable("offline".into())));

        let err = service(identity_service, store)
            .register(&registration("secret1", "secret1"), Theme::Light)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::PartialWrite {
                committed: CommittedStep::AccountCreated,
                pending: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_preference_updates_touch_only_their_key() {
        let mut store = MockProfileStore::new();
        store
            .expect_update()
            .withf(|_, patch| patch.field_paths() == vec!["preferencias.tema"])
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_update()
            .withf(|_, patch| patch.field_paths() == vec!["preferencias.notificacoes"])
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("offline".into())));

        let sync = service(MockIdentityService::new(), store);
        sync.update_theme(&identity(), Theme::Dark).await.unwrap();
        assert!(sync.update_notifications(&identity(), false).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_swallows_failure() {
        let mut identity_service = MockIdentityService::new();
        identity_service
            .expect_sign_out()
            .times(1)
            .returning(|| Err(IdentityError::new(AuthErrorKind::NetworkRequestFailed, "offline")));

        service(identity_service, MockProfileStore::new())
            .sign_out()
            .await;
    }
}
