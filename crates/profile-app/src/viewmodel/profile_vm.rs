//! Profile ViewModel
//!
//! Profile header, preference switches and sign-out.

use tokio::sync::mpsc;
use tracing::warn;

use profile_core::{ProfileOverview, Theme, UserIdentity};

use super::LOAD_FAILED_MESSAGE;
use crate::context::SharedSync;
use crate::events::AppEvent;

pub struct ProfileViewModel {
    pub overview: Option<ProfileOverview>,
    pub notifications_enabled: bool,
    pub error: Option<String>,
    pub is_loading: bool,
    pub is_signing_out: bool,
    /// Reload requested while another was in flight
    queued: Option<UserIdentity>,
    sync: SharedSync,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ProfileViewModel {
    pub fn new(sync: SharedSync, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            overview: None,
            notifications_enabled: true,
            error: None,
            is_loading: false,
            is_signing_out: false,
            queued: None,
            sync,
            event_tx,
        }
    }

    /// Fetches the header. A request made during a fetch runs after it.
    pub fn load(&mut self, identity: UserIdentity) {
        if self.is_loading {
            self.queued = Some(identity);
            return;
        }

        self.error = None;
        self.is_loading = true;

        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let user = identity.id.clone();
            match sync.overview(&identity).await {
                Ok(overview) => {
                    let _ = tx.send(AppEvent::OverviewLoaded { user, overview });
                }
                Err(e) => {
                    warn!("Profile overview failed for {}: {}", user, e);
                    let _ = tx.send(AppEvent::OverviewLoadFailed {
                        user,
                        message: LOAD_FAILED_MESSAGE.to_string(),
                    });
                }
            }
        });
    }

    /// Stores an already-applied theme. A failure is logged and not retried.
    pub fn persist_theme(&self, identity: UserIdentity, theme: Theme) {
        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match sync.update_theme(&identity, theme).await {
                Ok(()) => {
                    let _ = tx.send(AppEvent::ThemeSaved(theme));
                }
                Err(e) => {
                    warn!("Theme preference not saved for {}: {}", identity.id, e);
                    let _ = tx.send(AppEvent::PreferenceUpdateFailed(e.to_string()));
                }
            }
        });
    }

    /// The switch only moves once the store accepted the new value.
    pub fn set_notifications(&self, identity: UserIdentity, enabled: bool) {
        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match sync.update_notifications(&identity, enabled).await {
                Ok(()) => {
                    let _ = tx.send(AppEvent::NotificationsSaved {
                        user: identity.id.clone(),
                        enabled,
                    });
                }
                Err(e) => {
                    warn!("Notification preference not saved for {}: {}", identity.id, e);
                    let _ = tx.send(AppEvent::PreferenceUpdateFailed(e.to_string()));
                }
            }
        });
    }

    pub fn sign_out(&mut self) {
        if self.is_signing_out {
            return;
        }
        self.is_signing_out = true;

        let sync = SharedSync::clone(&self.sync);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            sync.sign_out().await;
            let _ = tx.send(AppEvent::SignedOut);
        });
    }

    pub fn on_loaded(&mut self, overview: ProfileOverview) {
        self.is_loading = false;
        self.notifications_enabled = overview.notifications_enabled;
        self.overview = Some(overview);
        self.run_queued();
    }

    pub fn on_load_failed(&mut self, error: String) {
        self.is_loading = false;
        self.error = Some(error);
        self.run_queued();
    }

    fn run_queued(&mut self) {
        if let Some(identity) = self.queued.take() {
            self.load(identity);
        }
    }

    pub fn on_notifications_saved(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
        if let Some(overview) = self.overview.as_mut() {
            overview.notifications_enabled = enabled;
        }
    }

    pub fn on_signed_out(&mut self) {
        self.is_signing_out = false;
        self.is_loading = false;
        self.queued = None;
        self.overview = None;
        self.notifications_enabled = true;
        self.error = None;
    }
}
