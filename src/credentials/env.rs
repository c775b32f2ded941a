//! Environment variable credentials provider.

use super::{Credentials, CredentialsProvider};
use crate::error::{CredentialsError, LaraError};
use async_trait::async_trait;
use std::env;

/// Environment variable holding the access key ID.
pub const LARA_ACCESS_KEY_ID: &str = "LARA_ACCESS_KEY_ID";
/// Environment variable holding the access key secret.
pub const LARA_ACCESS_KEY_SECRET: &str = "LARA_ACCESS_KEY_SECRET";

/// Credentials provider that reads from environment variables.
///
/// Both `LARA_ACCESS_KEY_ID` and `LARA_ACCESS_KEY_SECRET` must be set and
/// non-empty. Variable names can be overridden with [`with_vars`].
///
/// [`with_vars`]: EnvCredentialsProvider::with_vars
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialsProvider {
    access_key_id_var: Option<String>,
    access_key_secret_var: Option<String>,
}

impl EnvCredentialsProvider {
    /// Create a new environment credentials provider with default variable names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with custom variable names.
    pub fn with_vars(
        access_key_id_var: impl Into<String>,
        access_key_secret_var: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id_var: Some(access_key_id_var.into()),
            access_key_secret_var: Some(access_key_secret_var.into()),
        }
    }

    fn access_key_id_var(&self) -> &str {
        self.access_key_id_var.as_deref().unwrap_or(LARA_ACCESS_KEY_ID)
    }

    fn access_key_secret_var(&self) -> &str {
        self.access_key_secret_var
            .as_deref()
            .unwrap_or(LARA_ACCESS_KEY_SECRET)
    }

    fn read(name: &str) -> Result<String, LaraError> {
        let value = env::var(name).map_err(|_| LaraError::Credentials(CredentialsError::NotFound))?;
        if value.is_empty() {
            return Err(CredentialsError::Invalid {
                message: format!("{} is empty", name),
            }
            .into());
        }
        Ok(value)
    }
}

#[async_trait]
impl CredentialsProvider for EnvCredentialsProvider {
    async fn get_credentials(&self) -> Result<Credentials, LaraError> {
        let access_key_id = Self::read(self.access_key_id_var())?;
        let access_key_secret = Self::read(self.access_key_secret_var())?;

        Ok(Credentials::new(access_key_id, access_key_secret))
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}
