//! Credential resolution and refresh.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::error::{AuthError, AuthResult};
use crate::config::{AuthConfig, AuthSettings};

/// OAuth client-credentials settings.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub scope: Option<String>,
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &"***")
            .field("client_secret", &"***")
            .field("token_url", &self.token_url)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The authentication flow in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Personal access token.
    Static(Credential),
    /// Client-credentials exchange against a token endpoint.
    OAuth(OAuthClient),
}

impl AuthStrategy {
    /// Pick the flow for a set of raw options.
    ///
    /// A static token wins outright; OAuth options are then ignored even if
    /// complete. Without a token, client id, secret and token URL must all be
    /// present.
    pub fn resolve(config: &AuthConfig) -> AuthResult<Self> {
        if let Some(token) = &config.token {
            return Ok(AuthStrategy::Static(Credential::from_static(token.clone())));
        }

        let missing: Vec<&str> = [
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
            ("token_url", &config.token_url),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

        match (&config.client_id, &config.client_secret, &config.token_url) {
            (Some(client_id), Some(client_secret), Some(token_url)) => {
                Ok(AuthStrategy::OAuth(OAuthClient {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    token_url: token_url.clone(),
                    scope: config.scope.clone(),
                }))
            }
            _ => Err(AuthError::Config(format!(
                "provide a personal access token, or OAuth client credentials (missing: {})",
                missing.join(", ")
            ))),
        }
    }
}

/// Token endpoint response; only the fields we use.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

/// `expires_in` arrives as a number or a numeric string depending on the IdP.
///
/// Unparsable or non-positive values yield `Ok(None)`. A lifetime too large
/// to represent is an error.
fn parse_ttl(value: &serde_json::Value) -> Result<Option<Duration>, &'static str> {
    let seconds = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => Duration::try_from_secs_f64(seconds)
            .map(Some)
            .map_err(|_| "expires_in out of range"),
        _ => Ok(None),
    }
}

/// Supplies a currently valid credential, refreshing OAuth tokens on demand.
///
/// The provider owns the only cached token for its workspace. Refreshes are
/// serialized: callers that find the token expired while another caller is
/// already exchanging wait for that exchange and reuse its result.
pub struct CredentialProvider {
    strategy: AuthStrategy,
    http: reqwest::Client,
    refresh_skew: Duration,
    exchange_timeout: Duration,
    cached: Mutex<Option<Credential>>,
    /// Bumped after every successful exchange.
    generation: AtomicU64,
}

impl CredentialProvider {
    pub fn new(strategy: AuthStrategy, http: reqwest::Client, settings: &AuthSettings) -> Self {
        Self {
            strategy,
            http,
            refresh_skew: settings.refresh_skew(),
            exchange_timeout: settings.exchange_timeout(),
            cached: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve the strategy from raw options and build the provider.
    pub fn from_config(
        config: &AuthConfig,
        http: reqwest::Client,
        settings: &AuthSettings,
    ) -> AuthResult<Self> {
        Ok(Self::new(AuthStrategy::resolve(config)?, http, settings))
    }

    /// Return a credential that is valid for at least the refresh skew.
    pub async fn get_credential(&self) -> AuthResult<Credential> {
        let client = match &self.strategy {
            AuthStrategy::Static(credential) => return Ok(credential.clone()),
            AuthStrategy::OAuth(client) => client,
        };

        let seen = self.generation.load(Ordering::Acquire);
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref() {
            // Someone refreshed while we were queued on the lock.
            if self.generation.load(Ordering::Acquire) != seen {
                return Ok(credential.clone());
            }
            if !credential.needs_refresh(Instant::now(), self.refresh_skew) {
                return Ok(credential.clone());
            }
            debug!("cached OAuth token is inside the refresh window");
        }

        let fresh = self.exchange(client).await?;
        *cached = Some(fresh.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(fresh)
    }

    /// Replace a credential the backend just rejected.
    ///
    /// If the cached token already differs from `rejected`, another caller has
    /// refreshed it and that token is returned without a new exchange.
    pub async fn force_refresh(&self, rejected: &Credential) -> AuthResult<Credential> {
        let client = match &self.strategy {
            AuthStrategy::Static(credential) => return Ok(credential.clone()),
            AuthStrategy::OAuth(client) => client,
        };

        let mut cached = self.cached.lock().await;
        if let Some(credential) = cached.as_ref() {
            if credential.token() != rejected.token() {
                return Ok(credential.clone());
            }
        }

        warn!("backend rejected the OAuth token, exchanging a new one");
        let fresh = self.exchange(client).await?;
        *cached = Some(fresh.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(fresh)
    }

    async fn exchange(&self, client: &OAuthClient) -> AuthResult<Credential> {
        let url = client.token_url.as_str();
        info!(token_url = %url, "requesting OAuth access token");

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ];
        if let Some(scope) = &client.scope {
            form.push(("scope", scope.as_str()));
        }

        let response = self
            .http
            .post(url)
            .form(&form)
            .timeout(self.exchange_timeout)
            .send()
            .await
            .map_err(|e| AuthError::exchange(url, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::exchange(url, e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::exchange(
                url,
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        let payload: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::exchange(url, format!("malformed token response: {}", e)))?;

        let token = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::exchange(url, "token endpoint did not return access_token"))?;

        // Without a usable lifetime the token is treated as already expiring,
        // so the next call exchanges again.
        let ttl = match payload.expires_in.as_ref() {
            Some(value) => parse_ttl(value).map_err(|reason| AuthError::exchange(url, reason))?,
            None => None,
        };
        if ttl.is_none() {
            warn!("token endpoint returned no usable expires_in");
        }
        let expires_at = Instant::now()
            .checked_add(ttl.unwrap_or(Duration::ZERO))
            .ok_or_else(|| AuthError::exchange(url, "expires_in out of range"))?;

        debug!(ttl_secs = ttl.map(|t| t.as_secs()), "OAuth access token issued");
        Ok(Credential::from_oauth(token, expires_at))
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("strategy", &self.strategy)
            .field("refresh_skew", &self.refresh_skew)
            .finish()
    }
}
