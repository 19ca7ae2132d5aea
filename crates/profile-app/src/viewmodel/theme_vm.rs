//! Theme ViewModel
//!
//! App-wide color scheme. Changes apply locally right away, persisting them
//! is the profile screen's job.

use profile_core::Theme;

#[derive(Debug, Default)]
pub struct ThemeViewModel {
    pub theme: Theme,
}

impl ThemeViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Flips the theme and returns the new one.
    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}
