//! Configuration module for Heron.
//!
//! Handles workspace connection settings from the environment and tuning
//! settings from an optional TOML file.

mod settings;
mod workspace;

pub use settings::{AuthSettings, HttpSettings, QuerySettings, Settings, SettingsError};
pub use workspace::{AuthConfig, ConfigError, WorkspaceConfig};
