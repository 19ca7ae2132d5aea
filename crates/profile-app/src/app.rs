//! Root Application
//!
//! Owns the view models, the signed-in identity and the screen stack, and
//! applies background results to them.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use profile_core::{UserId, UserIdentity};

use crate::context::AppContext;
use crate::events::AppEvent;
use crate::route::{Navigator, Route};
use crate::viewmodel::{
    EditProfileViewModel, LoginViewModel, ProfileViewModel, RegisterViewModel, ThemeViewModel,
};

pub struct App {
    pub navigator: Navigator,
    pub session: Option<UserIdentity>,
    pub login_vm: LoginViewModel,
    pub register_vm: RegisterViewModel,
    pub profile_vm: ProfileViewModel,
    pub edit_profile_vm: EditProfileViewModel,
    pub theme_vm: ThemeViewModel,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    _context: AppContext,
}

impl App {
    pub fn new(context: AppContext) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = context.sync.identity_service().current_identity();
        let sync = context.sync.clone();

        Self {
            navigator: Navigator::initial(session.is_some()),
            session,
            login_vm: LoginViewModel::new(sync.clone(), event_tx.clone()),
            register_vm: RegisterViewModel::new(sync.clone(), event_tx.clone()),
            profile_vm: ProfileViewModel::new(sync.clone(), event_tx.clone()),
            edit_profile_vm: EditProfileViewModel::new(sync, event_tx),
            theme_vm: ThemeViewModel::new(),
            event_rx,
            _context: context,
        }
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    // ========================================================================
    // USER ACTIONS
    // ========================================================================

    pub fn login(&mut self) {
        self.login_vm.login();
    }

    pub fn open_register(&mut self) {
        self.navigator.push(Route::Register);
    }

    pub fn register(&mut self) {
        self.register_vm.register(self.theme_vm.theme);
    }

    pub fn refresh_profile(&mut self) {
        if let Some(identity) = self.session.clone() {
            self.profile_vm.load(identity);
        }
    }

    pub fn open_edit_profile(&mut self) {
        let Some(identity) = self.session.clone() else {
            warn!("Edit profile requested without a signed-in user");
            return;
        };
        self.edit_profile_vm.load(identity);
        self.navigator.push(Route::EditProfile);
    }

    pub fn save_profile(&mut self) {
        if let Some(identity) = self.session.clone() {
            self.edit_profile_vm.save(identity);
        }
    }

    pub fn retry_pending_save(&mut self) {
        if let Some(identity) = self.session.clone() {
            self.edit_profile_vm.retry_pending(identity);
        }
    }

    /// Applies locally first, then stores the new value.
    pub fn toggle_theme(&mut self) {
        let theme = self.theme_vm.toggle();
        if let Some(identity) = self.session.clone() {
            self.profile_vm.persist_theme(identity, theme);
        }
    }

    pub fn set_notifications(&mut self, enabled: bool) {
        if let Some(identity) = self.session.clone() {
            self.profile_vm.set_notifications(identity, enabled);
        }
    }

    pub fn sign_out(&mut self) {
        self.profile_vm.sign_out();
    }

    pub fn navigate_back(&mut self) -> bool {
        self.navigator.back()
    }

    // ========================================================================
    // EVENT DISPATCH
    // ========================================================================

    /// Applies every event already queued. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Waits for the next event and applies it.
    pub async fn next_event(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginSuccess(identity) => {
                info!("Signed in as {}", identity.id);
                self.login_vm.on_login_success();
                self.start_session(identity);
            }
            AppEvent::LoginFailed(msg) => {
                self.login_vm.on_login_failed(msg);
            }
            AppEvent::RegisterSuccess(identity) => {
                info!("Registered {}", identity.id);
                self.register_vm.on_register_success();
                self.start_session(identity);
            }
            AppEvent::RegisterFailed(msg) => {
                self.register_vm.on_register_failed(msg);
            }
            AppEvent::ProfileLoaded { user, form } => {
                if self.is_current(&user) {
                    self.edit_profile_vm.on_loaded(form);
                }
            }
            AppEvent::ProfileLoadFailed { user, message } => {
                if self.is_current(&user) {
                    self.edit_profile_vm.on_load_failed(message);
                }
            }
            AppEvent::ProfileSaved { user, saved } => {
                if !self.is_current(&user) {
                    return;
                }
                self.edit_profile_vm.on_saved();
                self.set_session_display_name(saved.display_name);
                if self.navigator.current() == Route::EditProfile {
                    self.navigator.back();
                }
                self.refresh_profile();
            }
            AppEvent::ProfileSaveFailed {
                user,
                message,
                pending,
            } => {
                if !self.is_current(&user) {
                    return;
                }
                // The identity provider already holds the new name.
                if let Some(pending) = &pending {
                    self.set_session_display_name(pending.display_name.clone());
                }
                self.edit_profile_vm.on_save_failed(message, pending);
            }
            AppEvent::OverviewLoaded { user, overview } => {
                if self.is_current(&user) {
                    self.profile_vm.on_loaded(overview);
                }
            }
            AppEvent::OverviewLoadFailed { user, message } => {
                if self.is_current(&user) {
                    self.profile_vm.on_load_failed(message);
                }
            }
            AppEvent::ThemeSaved(theme) => {
                debug!("Theme preference stored: {}", theme.as_str());
            }
            AppEvent::NotificationsSaved { user, enabled } => {
                if self.is_current(&user) {
                    self.profile_vm.on_notifications_saved(enabled);
                }
            }
            AppEvent::PreferenceUpdateFailed(msg) => {
                debug!("Preference kept local only: {}", msg);
            }
            AppEvent::SignedOut => {
                self.session = None;
                self.profile_vm.on_signed_out();
                self.edit_profile_vm.reset();
                self.login_vm.clear();
                self.navigator.reset(Route::Login);
            }
        }
    }

    /// Results fetched for anyone but the signed-in user are stale.
    fn is_current(&self, user: &UserId) -> bool {
        let current = self.session.as_ref().map(|identity| &identity.id) == Some(user);
        if !current {
            debug!("Dropping result for {}, no longer signed in", user);
        }
        current
    }

    fn set_session_display_name(&mut self, display_name: String) {
        if let Some(identity) = self.session.as_mut() {
            identity.display_name = Some(display_name);
        }
    }

    fn start_session(&mut self, identity: UserIdentity) {
        self.session = Some(identity.clone());
        self.navigator.reset(Route::Tabs);
        self.profile_vm.load(identity);
    }
}
