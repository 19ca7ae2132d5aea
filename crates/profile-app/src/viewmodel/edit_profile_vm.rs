//! Edit Profile ViewModel
//!
//! Name, phone and bio editing. Email is shown read-only.

use tokio::sync::mpsc;
use tracing::{info, warn};

use profile_core::validation::validate_profile_edit;
use profile_core::{
    CommittedStep, ProfileError, ProfileForm, ProfilePatch, SavedProfile, UserIdentity,
};

use super::{LOAD_FAILED_MESSAGE, SAVE_FAILED_MESSAGE};
use crate::context::SharedSync;
use crate::events::AppEvent;

/// Document write left over from a partial save, together with the display
/// name the identity provider already accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub display_name: String,
    pub patch: ProfilePatch,
}

pub struct EditProfileViewModel {
    pub form: ProfileForm,
    pub error: Option<String>,
    /// Form is being fetched
    pub is_loading: bool,
    /// Save in flight, further submits are ignored
    pub is_saving: bool,
    pub pending: Option<PendingWrite>,
    sync: SharedSync,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl EditProfileViewModel {
    pub fn new(sync: SharedSync, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            form: ProfileForm::new(String::new()),
            error: None,
            is_loading: false,
            is_saving: false,
            pending: None,
            sync,
            event_tx,
        }
    }

    pub fn load(&mut self, identity: UserIdentity) {
        if self.is_loading {
            return;
        }

        self.error = None;
        self.is_loading = true;
        self.form = ProfileForm::new(identity.email.clone());

        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let user = identity.id.clone();
            match sync.load(&identity).await {
                Ok(form) => {
                    let _ = tx.send(AppEvent::ProfileLoaded { user, form });
                }
                Err(e) => {
                    warn!("Profile load failed for {}: {}", user, e);
                    let _ = tx.send(AppEvent::ProfileLoadFailed {
                        user,
                        message: LOAD_FAILED_MESSAGE.to_string(),
                    });
                }
            }
        });
    }

    pub fn set_bio(&mut self, bio: &str) {
        self.form.set_bio(bio);
    }

    pub fn bio_remaining(&self) -> usize {
        self.form.bio_remaining()
    }

    pub fn save(&mut self, identity: UserIdentity) {
        if self.is_saving {
            return;
        }

        if let Err(failure) = validate_profile_edit(&self.form) {
            self.error = Some(failure.to_string());
            return;
        }

        self.error = None;
        self.is_saving = true;

        let form = self.form.clone();
        let display_name = form.name.trim().to_string();
        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let user = identity.id.clone();
            let (message, pending) = match sync.save(&identity, &form).await {
                Ok(saved) => {
                    let _ = tx.send(AppEvent::ProfileSaved { user, saved });
                    return;
                }
                Err(ProfileError::Validation(failure)) => (failure.to_string(), None),
                Err(ProfileError::PartialWrite {
                    committed: CommittedStep::DisplayNameUpdated,
                    pending: Some(patch),
                    ..
                }) => (
                    SAVE_FAILED_MESSAGE.to_string(),
                    Some(PendingWrite {
                        display_name,
                        patch,
                    }),
                ),
                Err(_) => (SAVE_FAILED_MESSAGE.to_string(), None),
            };
            let _ = tx.send(AppEvent::ProfileSaveFailed {
                user,
                message,
                pending,
            });
        });
    }

    /// Replays the document write of a partial save. Only on user request.
    ///
    /// Edits made to the form since the failed save are not part of the replay.
    pub fn retry_pending(&mut self, identity: UserIdentity) {
        if self.is_saving {
            return;
        }
        let Some(pending) = self.pending.clone() else {
            return;
        };

        self.error = None;
        self.is_saving = true;

        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let user = identity.id.clone();
            match sync.complete_partial_write(&identity, &pending.patch).await {
                Ok(()) => {
                    info!("Pending profile write replayed for {}", user);
                    let saved = SavedProfile {
                        display_name: pending.display_name,
                        patch: pending.patch,
                    };
                    let _ = tx.send(AppEvent::ProfileSaved { user, saved });
                }
                Err(e) => {
                    warn!("Pending profile write failed again for {}: {}", user, e);
                    let _ = tx.send(AppEvent::ProfileSaveFailed {
                        user,
                        message: SAVE_FAILED_MESSAGE.to_string(),
                        pending: Some(pending),
                    });
                }
            }
        });
    }

    pub fn on_loaded(&mut self, form: ProfileForm) {
        self.is_loading = false;
        self.form = form;
    }

    pub fn on_load_failed(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
    }

    pub fn on_saved(&mut self) {
        self.is_saving = false;
        self.pending = None;
        self.error = None;
    }

    pub fn reset(&mut self) {
        self.form = ProfileForm::new(String::new());
        self.error = None;
        self.is_loading = false;
        self.is_saving = false;
        self.pending = None;
    }

    pub fn on_save_failed(&mut self, error: String, pending: Option<PendingWrite>) {
        self.is_saving = false;
        self.error = Some(error);
        if pending.is_some() {
            self.pending = pending;
        }
    }
}
