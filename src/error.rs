//! Crate-level error type.

use thiserror::Error;

use crate::auth::AuthError;
use crate::backend::BackendError;
use crate::catalog::ReferenceError;
use crate::config::{ConfigError, SettingsError};
use crate::normalize::NormalizationError;
use crate::query::QueryError;

/// Result type for operations that cross module boundaries.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid name: {0}")]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Query(#[from] QueryError),
}
