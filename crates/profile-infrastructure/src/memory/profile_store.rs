//! In-memory profile document store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use profile_core::repositories::ProfileStore;
use profile_core::{ProfilePatch, StoreError, UserId, UserProfile};

/// Calls that can be made to fail once via [`InMemoryProfileStore::fail_next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    documents: RwLock<HashMap<UserId, UserProfile>>,
    failures: Mutex<HashMap<StoreOp, StoreError>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.failures.lock().insert(op, error);
    }

    /// Current document for `id`, bypassing injected failures.
    pub fn document(&self, id: &UserId) -> Option<UserProfile> {
        self.documents.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn take_failure(&self, op: StoreOp) -> Result<(), StoreError> {
        match self.failures.lock().remove(&op) {
            Some(error) => {
                warn!("Injected {:?} failure: {}", op, error);
                Err(error)
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        self.take_failure(StoreOp::Get)?;
        Ok(self.documents.read().get(id).cloned())
    }

    async fn create(&self, id: &UserId, profile: &UserProfile) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Create)?;
        self.documents.write().insert(id.clone(), profile.clone());
        debug!("Profile document written: {}", id);
        Ok(())
    }

    async fn update(&self, id: &UserId, patch: &ProfilePatch) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Update)?;
        let mut documents = self.documents.write();
        let document = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        patch.apply_to(document);
        debug!("Profile document updated: {} {:?}", id, patch.field_paths());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use profile_core::Theme;

    fn profile() -> UserProfile {
        UserProfile::new("Ana".to_string(), "ana@example.com".to_string(), Theme::Dark).unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let store = InMemoryProfileStore::new();
        assert_eq!(store.get(&UserId::new("uid-1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_overwrites() {
        let store = InMemoryProfileStore::new();
        let id = UserId::new("uid-1");
        store.create(&id, &profile()).await.unwrap();

        let mut replacement = profile();
        replacement.name = "Ana Lima".to_string();
        store.create(&id, &replacement).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryProfileStore::new();
        let id = UserId::new("uid-1");
        store.create(&id, &profile()).await.unwrap();

        let now = Utc::now();
        store
            .update(&id, &ProfilePatch::profile_edit("Ana Lima", "(85) 98888-7777", "", now))
            .await
            .unwrap();
        store.update(&id, &ProfilePatch::notifications(false)).await.unwrap();

        let doc = store.document(&id).unwrap();
        assert_eq!(doc.name, "Ana Lima");
        assert_eq!(doc.phone.as_deref(), Some("(85) 98888-7777"));
        assert_eq!(doc.bio, None);
        assert_eq!(doc.updated_at, Some(now));
        assert_eq!(doc.preferences.theme, Theme::Dark);
        assert!(!doc.preferences.notifications);
        assert_eq!(doc.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = InMemoryProfileStore::new();
        let id = UserId::new("uid-404");
        let err = store.update(&id, &ProfilePatch::theme(Theme::Light)).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(id));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_document_untouched() {
        let store = InMemoryProfileStore::new();
        let id = UserId::new("uid-1");
        store.create(&id, &profile()).await.unwrap();

        store.fail_next(StoreOp::Update, StoreError::Unavailable("offline".into()));
        assert!(store.update(&id, &ProfilePatch::theme(Theme::Light)).await.is_err());
        assert_eq!(store.document(&id).unwrap().preferences.theme, Theme::Dark);

        store.update(&id, &ProfilePatch::theme(Theme::Light)).await.unwrap();
        assert_eq!(store.document(&id).unwrap().preferences.theme, Theme::Light);
    }
}
