//! Chain credentials provider that tries multiple sources.

use super::{Credentials, CredentialsProvider, EnvCredentialsProvider, ProfileCredentialsProvider};
use crate::error::{CredentialsError, LaraError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// Credentials provider that chains multiple providers.
///
/// The chain tries each provider in order until one succeeds. By default:
/// 1. Environment variables (`LARA_ACCESS_KEY_ID`, `LARA_ACCESS_KEY_SECRET`)
/// 2. Profile file (`~/.lara/credentials`)
///
/// Lara keys do not expire, so the first successful result is cached for the
/// lifetime of the provider.
pub struct ChainCredentialsProvider {
    providers: Vec<Arc<dyn CredentialsProvider>>,
    cached: RwLock<Option<CachedCredentials>>,
}

struct CachedCredentials {
    credentials: Credentials,
    provider_name: &'static str,
}

impl ChainCredentialsProvider {
    /// Create a new chain with the default providers.
    pub fn new() -> Self {
        Self::with_providers(vec![
            Arc::new(EnvCredentialsProvider::new()),
            Arc::new(ProfileCredentialsProvider::new()),
        ])
    }

    /// Create a chain with custom providers.
    pub fn with_providers(providers: Vec<Arc<dyn CredentialsProvider>>) -> Self {
        Self {
            providers,
            cached: RwLock::new(None),
        }
    }

    /// Add a provider to the end of the chain.
    pub fn add_provider(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Drop the cached credentials so the next call walks the chain again.
    pub fn clear_cache(&self) {
        *self.cached.write() = None;
    }

    async fn try_providers(&self) -> Result<(Credentials, &'static str), LaraError> {
        let mut last_error: Option<LaraError> = None;

        for provider in &self.providers {
            let name = provider.name();
            trace!(provider = name, "Trying credentials provider");

            match provider.get_credentials().await {
                Ok(creds) => {
                    debug!(provider = name, "Credentials loaded");
                    return Ok((creds, name));
                }
                Err(e) => {
                    trace!(provider = name, error = %e, "Credentials provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LaraError::Credentials(CredentialsError::NotFound)))
    }
}

impl Default for ChainCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsProvider for ChainCredentialsProvider {
    async fn get_credentials(&self) -> Result<Credentials, LaraError> {
        let cached = self
            .cached
            .read()
            .as_ref()
            .map(|c| (c.credentials.clone(), c.provider_name));
        if let Some((creds, name)) = cached {
            trace!(provider = name, "Using cached credentials");
            return Ok(creds);
        }

        let (creds, name) = self.try_providers().await?;

        *self.cached.write() = Some(CachedCredentials {
            credentials: creds.clone(),
            provider_name: name,
        });

        Ok(creds)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

impl std::fmt::Debug for ChainCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCredentialsProvider")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
