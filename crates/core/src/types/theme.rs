//! Persisted display theme preference.
//!
//! The theme itself is presentation, but the persisted key is part of the
//! client state directory alongside the token and cart snapshot, so the
//! enum lives here with the other shared types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display theme, persisted under the `theme` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Error for unrecognized persisted theme values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown theme: {0} (expected 'light' or 'dark')")]
pub struct ThemeParseError(pub String);

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}
