//! File-backed client state.
//!
//! The state directory is the desktop analogue of the browser's local
//! storage: one small file per key. Three keys exist today:
//!
//! - `token` - opaque bearer token, plain text
//! - `cart.json` - the cart snapshot, a JSON array of cart lines
//! - `theme` - display theme, `light` or `dark`
//!
//! Writes go through a temp file and rename so a concurrent reader in
//! another process never sees a half-written value. Cross-process
//! consistency stays best-effort: readers re-read the file rather than
//! trusting an in-memory copy.

mod prefs;
mod token;

pub use prefs::Preferences;
pub use token::TokenStore;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Persisted key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Persisted key for the cart snapshot.
pub const CART_KEY: &str = "cart.json";
/// Persisted key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// Handle to the client state directory.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Open (creating if necessary) the state directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Absolute path of the file backing `key`.
    #[must_use]
    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Read the value stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on any failure other than the file not
    /// existing.
    pub fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Write `value` under `key`, atomically via temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the write or rename fails.
    pub fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        let tmp = tmp_path(&path);
        fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    /// Remove the value stored under `key`. Absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on any failure other than the file not
    /// existing.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Whether a value exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.path(key).exists()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
