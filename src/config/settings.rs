//! TOML-based tuning for Heron.
//!
//! Supports a config file (heron.toml). Every key is optional.
//!
//! Example configuration:
//! ```toml
//! [http]
//! timeout_seconds = 30
//! max_pages = 50
//!
//! [auth]
//! refresh_skew_seconds = 30
//! exchange_timeout_seconds = 10
//!
//! [query]
//! wait_timeout_seconds = 50
//! initial_poll_interval_ms = 250
//! max_poll_interval_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP transport settings.
    pub http: HttpSettings,

    /// Credential refresh settings.
    pub auth: AuthSettings,

    /// Statement execution settings.
    pub query: QuerySettings,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout.
    pub timeout_seconds: u64,

    /// Upper bound on pages followed for a single listing call.
    pub max_pages: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_pages: 50,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Credential refresh settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Refresh OAuth tokens this many seconds before they expire.
    pub refresh_skew_seconds: u64,

    /// Timeout for a single token exchange.
    pub exchange_timeout_seconds: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            refresh_skew_seconds: 30,
            exchange_timeout_seconds: 10,
        }
    }
}

impl AuthSettings {
    pub fn refresh_skew(&self) -> Duration {
        Duration::from_secs(self.refresh_skew_seconds)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_seconds)
    }
}

/// Statement execution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// How long `execute` polls before handing back a RUNNING outcome.
    pub wait_timeout_seconds: u64,

    /// First delay between status polls.
    pub initial_poll_interval_ms: u64,

    /// Cap for the exponential poll backoff.
    pub max_poll_interval_ms: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            wait_timeout_seconds: 50,
            initial_poll_interval_ms: 250,
            max_poll_interval_ms: 5_000,
        }
    }
}

impl QuerySettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_seconds)
    }

    pub fn initial_poll_interval(&self) -> Duration {
        Duration::from_millis(self.initial_poll_interval_ms)
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `HERON_CONFIG`
    /// 2. `./heron.toml`
    /// 3. `~/.config/heron/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("HERON_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("heron.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("heron").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.http.max_pages == 0 {
            return Err(SettingsError::InvalidConfig(
                "http.max_pages must be at least 1".to_string(),
            ));
        }
        if self.query.initial_poll_interval_ms == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.initial_poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.query.max_poll_interval_ms < self.query.initial_poll_interval_ms {
            return Err(SettingsError::InvalidConfig(
                "query.max_poll_interval_ms must not be below initial_poll_interval_ms"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
