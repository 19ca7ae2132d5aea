//! Application Events
//!
//! Results sent from background tasks back to the view models. Results of
//! per-user work carry the id they were fetched for, so late arrivals from a
//! previous session can be dropped.

use profile_core::{ProfileForm, ProfileOverview, SavedProfile, Theme, UserId, UserIdentity};

use crate::viewmodel::PendingWrite;

#[derive(Debug)]
pub enum AppEvent {
    LoginSuccess(UserIdentity),
    LoginFailed(String),

    RegisterSuccess(UserIdentity),
    RegisterFailed(String),

    ProfileLoaded {
        user: UserId,
        form: ProfileForm,
    },
    ProfileLoadFailed {
        user: UserId,
        message: String,
    },
    ProfileSaved {
        user: UserId,
        saved: SavedProfile,
    },
    /// `pending` is set when the display name was saved and the document was not
    ProfileSaveFailed {
        user: UserId,
        message: String,
        pending: Option<PendingWrite>,
    },

    OverviewLoaded {
        user: UserId,
        overview: ProfileOverview,
    },
    OverviewLoadFailed {
        user: UserId,
        message: String,
    },

    ThemeSaved(Theme),
    NotificationsSaved {
        user: UserId,
        enabled: bool,
    },
    PreferenceUpdateFailed(String),

    SignedOut,
}
