//! Backend-specific error types.

use thiserror::Error;

use crate::auth::AuthError;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while talking to the workspace API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No credential could be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The backend refused the credential even after one refresh.
    #[error("credential rejected by the workspace (HTTP {status}) after refresh")]
    AuthRejected {
        /// Status of the second rejection (401 or 403).
        status: u16,
    },

    /// Server-side failure or transport error. Safe to retry later.
    #[error("workspace unavailable: {0}")]
    Unavailable(String),

    /// The request itself was refused, e.g. an unknown catalog or table.
    #[error("request rejected (HTTP {status}): {message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Backend error message (`ERROR_CODE: message` when structured).
        message: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("unexpected response from workspace: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether a caller-level retry with backoff may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// HTTP status attached to this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRejected { status } | Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
