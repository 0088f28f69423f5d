//! Workspace authentication.
//!
//! Two mutually exclusive flows are supported:
//!
//! - **Static**: a personal access token, used as-is for the process lifetime.
//! - **OAuth**: a client-credentials exchange against a token endpoint. The
//!   resulting token is cached and exchanged again shortly before it expires.
//!
//! ```ignore
//! use heron::auth::CredentialProvider;
//!
//! let provider = CredentialProvider::from_config(&config.auth, http, &settings.auth)?;
//! let credential = provider.get_credential().await?;
//! request.header("Authorization", credential.header_value());
//! ```

mod credential;
mod error;
mod provider;

pub use credential::{Credential, CredentialSource};
pub use error::{AuthError, AuthResult};
pub use provider::{AuthStrategy, CredentialProvider, OAuthClient};
