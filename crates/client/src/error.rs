//! Error taxonomy for gateway calls and local state persistence.
//!
//! Every backend failure maps onto one of four caller-visible categories:
//! network (unreachable/timeout), auth (401), validation (other 4xx), and
//! server (5xx). Callers treat all of them as non-fatal for the process:
//! log, surface a notice, and leave persisted state alone.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors from calls through the HTTP gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend unreachable, connection reset, or timeout.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the bearer token (401).
    #[error("Authentication required")]
    Auth,

    /// The backend rejected the request itself (4xx other than 401).
    #[error("Validation error ({status}): {message}")]
    Validation { status: u16, message: String },

    /// The backend failed (5xx).
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response body did not parse as the expected shape.
    #[error("Response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Local state persistence failed mid-operation (e.g. storing the
    /// token a successful login returned).
    #[error("State error: {0}")]
    State(#[from] StoreError),

    /// A fetch owned by a concurrent caller failed; the error is shared
    /// with every caller that was waiting on the same in-flight request.
    #[error(transparent)]
    Shared(Arc<ApiError>),
}

impl ApiError {
    /// Map a non-2xx, non-401 status plus body text onto the taxonomy.
    ///
    /// 401 is deliberately not handled here: unauthorized responses go
    /// through the gateway's session-teardown path first.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        if status >= 500 {
            Self::Server { status, message }
        } else {
            Self::Validation { status, message }
        }
    }
}

/// Result type alias for gateway calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from the file-backed state directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a state file failed.
    #[error("State I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted snapshot did not parse.
    #[error("Corrupt state at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
