//! Bearer credentials.

use std::fmt;
use std::time::{Duration, Instant};

/// Where a credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// A personal access token; never expires from our point of view.
    Static,
    /// A short-lived token from the client-credentials exchange.
    OAuth,
}

/// A bearer token plus its expiry.
///
/// The token itself only leaves this type as an `Authorization` header value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Option<Instant>,
    source: CredentialSource,
}

impl Credential {
    pub fn from_static(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
            source: CredentialSource::Static,
        }
    }

    pub fn from_oauth(token: impl Into<String>, expires_at: Instant) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
            source: CredentialSource::OAuth,
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// True once `now` is inside the `skew` window before expiry.
    ///
    /// Static credentials never need a refresh.
    pub fn needs_refresh(&self, now: Instant, skew: Duration) -> bool {
        match self.expires_at {
            None => false,
            // A skew past the end of time means every token is expiring.
            Some(expires_at) => now.checked_add(skew).map_or(true, |edge| edge >= expires_at),
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}
