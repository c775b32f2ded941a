//! Lara credentials management.
//!
//! This module provides the access key pair used to sign requests and the
//! providers that resolve it from explicit values, environment variables or a
//! profile-structured credentials file.

mod chain;
mod env;
mod profile;

pub use chain::ChainCredentialsProvider;
pub use env::{EnvCredentialsProvider, LARA_ACCESS_KEY_ID, LARA_ACCESS_KEY_SECRET};
pub use profile::{ProfileCredentialsProvider, DEFAULT_PROFILE, LARA_CREDENTIALS_FILE, LARA_PROFILE};

use crate::error::{CredentialsError, LaraError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Lara access key pair.
///
/// The secret is never sent over the wire; it only keys the request signature.
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    access_key_secret: SecretString,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::new(access_key_secret.into()),
        }
    }

    /// Get the access key ID.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Get the access key secret.
    ///
    /// Note: This exposes the secret. Use carefully and avoid logging.
    pub fn access_key_secret(&self) -> &str {
        self.access_key_secret.expose_secret()
    }

    pub(crate) fn validate(self) -> Result<Self, LaraError> {
        if self.access_key_id.trim().is_empty() {
            return Err(CredentialsError::Invalid {
                message: "access key ID is empty".to_string(),
            }
            .into());
        }
        if self.access_key_secret().trim().is_empty() {
            return Err(CredentialsError::Invalid {
                message: "access key secret is empty".to_string(),
            }
            .into());
        }
        Ok(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Trait for credential providers.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Get credentials from this provider.
    async fn get_credentials(&self) -> Result<Credentials, LaraError>;

    /// Provider name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Provider for an explicit key pair.
pub struct StaticCredentialsProvider {
    credentials: Credentials,
}

impl StaticCredentialsProvider {
    /// Create a new static credentials provider.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn get_credentials(&self) -> Result<Credentials, LaraError> {
        self.credentials.clone().validate()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

impl fmt::Debug for StaticCredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialsProvider")
            .field("credentials", &self.credentials)
            .finish()
    }
}
