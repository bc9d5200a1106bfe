//! Persisted display preferences.

use clementine_core::Theme;

use crate::error::StoreError;
use crate::storage::{StateDir, THEME_KEY};

/// Read/write access to the persisted preferences (currently just the theme).
#[derive(Debug, Clone)]
pub struct Preferences {
    state: StateDir,
}

impl Preferences {
    #[must_use]
    pub const fn new(state: StateDir) -> Self {
        Self { state }
    }

    /// The persisted theme, falling back to the default when absent or
    /// unrecognized (the stale value is logged, not fatal).
    #[must_use]
    pub fn theme(&self) -> Theme {
        match self.state.read(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unrecognized persisted theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    /// Persist the theme.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the preference file cannot be written.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.state.write(THEME_KEY, theme.as_str())
    }
}
