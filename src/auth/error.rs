//! Authentication error types.

use thiserror::Error;

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised while resolving or refreshing a credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Neither a static token nor a complete OAuth configuration is present.
    #[error("authentication is not configured: {0}")]
    Config(String),

    /// The OAuth client-credentials exchange failed.
    #[error("OAuth token exchange with {url} failed: {reason}")]
    Exchange {
        /// Token endpoint that was called.
        url: String,
        /// What went wrong (status and body, or transport failure).
        reason: String,
    },
}

impl AuthError {
    pub(crate) fn exchange(url: &str, reason: impl Into<String>) -> Self {
        Self::Exchange {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
