//! Workspace connection configuration.
//!
//! Supports configuration via environment variables:
//! - `DATABRICKS_HOST`: Workspace URL (required)
//! - `DATABRICKS_TOKEN` / `DATABRICKS_PAT`: Personal access token
//! - `DATABRICKS_CLIENT_ID`, `DATABRICKS_CLIENT_SECRET`, `DATABRICKS_OAUTH_TOKEN_URL`:
//!   OAuth client-credentials flow (`DATABRICKS_OAUTH_SCOPE` optional)
//! - `DATABRICKS_SQL_WAREHOUSE_ID`: SQL warehouse used for query execution

use std::env;
use std::fmt;

/// Error type for workspace configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Raw authentication options as found in the environment.
///
/// Nothing is validated here; [`crate::auth::AuthStrategy::resolve`] decides
/// which flow applies and whether it is complete.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Personal access token.
    pub token: Option<String>,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// OAuth token endpoint.
    pub token_url: Option<String>,
    /// OAuth scope to request.
    pub scope: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("AuthConfig")
            .field("token", &mask(&self.token))
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .field("token_url", &self.token_url)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Workspace connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Base URL of the workspace, without a trailing slash.
    pub host: String,
    /// Authentication options.
    pub auth: AuthConfig,
    /// SQL warehouse for statement execution (optional, only needed for queries).
    pub warehouse_id: Option<String>,
}

impl WorkspaceConfig {
    /// Create a config for a host and personal access token.
    pub fn with_token(host: &str, token: impl Into<String>) -> Self {
        Self {
            host: normalize_host(host),
            auth: AuthConfig {
                token: Some(token.into()),
                ..AuthConfig::default()
            },
            warehouse_id: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as absent, so `DATABRICKS_TOKEN=` does not
    /// shadow a complete OAuth configuration.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get("DATABRICKS_HOST")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABRICKS_HOST".to_string()))?;

        let bare = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_matches('/');
        if bare.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "DATABRICKS_HOST has no hostname".to_string(),
            ));
        }
        let host = normalize_host(&host);

        let auth = AuthConfig {
            token: get("DATABRICKS_TOKEN").or_else(|| get("DATABRICKS_PAT")),
            client_id: get("DATABRICKS_CLIENT_ID"),
            client_secret: get("DATABRICKS_CLIENT_SECRET"),
            token_url: get("DATABRICKS_OAUTH_TOKEN_URL"),
            scope: get("DATABRICKS_OAUTH_SCOPE"),
        };

        Ok(Self {
            host,
            auth,
            warehouse_id: get("DATABRICKS_SQL_WAREHOUSE_ID"),
        })
    }
}

/// Add a scheme when missing and strip trailing slashes.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
