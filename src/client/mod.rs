//! Lara client implementation.
//!
//! This module provides the main client interface and builder.

use crate::config::LaraConfig;
use crate::credentials::StaticCredentialsProvider;
use crate::error::LaraError;
use crate::http::ApiClient;
use crate::services::{DocumentsService, GlossariesService, MemoriesService, TranslatorService};
use crate::signing::LaraSigner;
use crate::transport::{HttpTransport, ReqwestTransport};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Lara client trait.
pub trait LaraClient: Send + Sync {
    /// Get the memories service.
    fn memories(&self) -> &MemoriesService;

    /// Get the glossaries service.
    fn glossaries(&self) -> &GlossariesService;

    /// Get the documents service.
    fn documents(&self) -> &DocumentsService;

    /// Get the text translation service.
    fn translator(&self) -> &TranslatorService;

    /// Get the client configuration.
    fn config(&self) -> &LaraConfig;
}

/// Lara client implementation.
pub struct LaraClientImpl {
    config: Arc<LaraConfig>,
    api: Arc<ApiClient>,

    // Lazy-initialized services
    memories: OnceCell<MemoriesService>,
    glossaries: OnceCell<GlossariesService>,
    documents: OnceCell<DocumentsService>,
    translator: OnceCell<TranslatorService>,
}

impl LaraClientImpl {
    /// Create a new client with the given configuration.
    pub fn new(config: LaraConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let config = Arc::new(config);
        let signer = Arc::new(LaraSigner::new(
            config.credentials_provider.clone(),
            config.signature_digest,
        ));
        let api = Arc::new(ApiClient::new(config.clone(), transport, signer));

        Self {
            config,
            api,
            memories: OnceCell::new(),
            glossaries: OnceCell::new(),
            documents: OnceCell::new(),
            translator: OnceCell::new(),
        }
    }
}

impl LaraClient for LaraClientImpl {
    fn memories(&self) -> &MemoriesService {
        self.memories
            .get_or_init(|| MemoriesService::new(self.api.clone(), self.config.clone()))
    }

    fn glossaries(&self) -> &GlossariesService {
        self.glossaries
            .get_or_init(|| GlossariesService::new(self.api.clone(), self.config.clone()))
    }

    fn documents(&self) -> &DocumentsService {
        self.documents
            .get_or_init(|| DocumentsService::new(self.api.clone(), self.config.clone()))
    }

    fn translator(&self) -> &TranslatorService {
        self.translator
            .get_or_init(|| TranslatorService::new(self.api.clone()))
    }

    fn config(&self) -> &LaraConfig {
        &self.config
    }
}

impl std::fmt::Debug for LaraClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaraClientImpl")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for the Lara client.
pub struct LaraClientBuilder {
    config: Option<LaraConfig>,
    from_env: bool,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl LaraClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            from_env: false,
            transport: None,
        }
    }

    /// Use the provided configuration.
    pub fn config(mut self, config: LaraConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    /// Use a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// Credentials are resolved here, once, and held for the client's
    /// lifetime; a missing or invalid key pair fails the build.
    pub async fn build(self) -> Result<LaraClientImpl, LaraError> {
        let mut config = if let Some(config) = self.config {
            config
        } else if self.from_env {
            LaraConfig::builder().from_env().build()?
        } else {
            LaraConfig::default()
        };

        if let Some(provider) = config.credentials_provider.take() {
            let credentials = provider.get_credentials().await?;
            debug!(provider = provider.name(), "Resolved credentials");
            config.credentials_provider =
                Some(Arc::new(StaticCredentialsProvider::new(credentials)));
        }

        let transport = if let Some(transport) = self.transport {
            transport
        } else {
            Arc::new(ReqwestTransport::from_config(&config)?)
        };

        Ok(LaraClientImpl::new(config, transport))
    }
}

impl Default for LaraClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{ChainCredentialsProvider, Credentials, CredentialsProvider};
    use crate::error::CredentialsError;
    use crate::mocks::{MockResponse, MockTransport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider(AtomicUsize);

    #[async_trait]
    impl CredentialsProvider for CountingProvider {
        async fn get_credentials(&self) -> Result<Credentials, LaraError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Credentials::new("COUNTED", "SECRET"))
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn languages_transport() -> Arc<MockTransport> {
        Arc::new(MockTransport::with_default(MockResponse::json_content(
            json!(["en-US", "it-IT"]),
        )))
    }

    #[tokio::test]
    async fn test_builder_unsigned() {
        let config = LaraConfig::builder().unsigned().build().unwrap();

        let client = LaraClientBuilder::new().config(config).build().await.unwrap();
        assert!(client.config().credentials_provider.is_none());
    }

    #[tokio::test]
    async fn test_builder_with_config() {
        let config = LaraConfig::builder()
            .base_url("https://lara.internal.example.com")
            .unsigned()
            .build()
            .unwrap();

        let client = LaraClientBuilder::new()
            .config(config)
            .build()
            .await
            .unwrap();
        assert_eq!(
            client.config().base_url.as_str(),
            "https://lara.internal.example.com/"
        );
    }

    #[tokio::test]
    async fn test_build_fails_without_credentials() {
        let config = LaraConfig::builder()
            .credentials_provider(Arc::new(ChainCredentialsProvider::with_providers(
                Vec::new(),
            )))
            .build()
            .unwrap();
        let transport = languages_transport();

        let result = LaraClientBuilder::new()
            .config(config)
            .transport(transport.clone())
            .build()
            .await;

        assert!(matches!(
            result,
            Err(LaraError::Credentials(CredentialsError::NotFound))
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_credentials_resolved_once_at_build() {
        let provider = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let config = LaraConfig::builder()
            .credentials_provider(provider.clone())
            .build()
            .unwrap();

        let client = LaraClientBuilder::new()
            .config(config)
            .transport(languages_transport())
            .build()
            .await
            .unwrap();
        assert_eq!(provider.0.load(Ordering::SeqCst), 1);

        client.translator().languages().await.unwrap();
        client.translator().languages().await.unwrap();
        assert_eq!(provider.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_services_share_signed_transport() {
        let transport = languages_transport();
        let config = LaraConfig::builder()
            .credentials(Credentials::new("AKID", "SECRET"))
            .build()
            .unwrap();
        let client = LaraClientBuilder::new()
            .config(config)
            .transport(transport.clone())
            .build()
            .await
            .unwrap();

        client.translator().languages().await.unwrap();

        let request = transport.last_request().unwrap();
        let authorization = request.get_header("authorization").unwrap();
        assert!(authorization.starts_with("Lara AKID:"));
        assert!(std::ptr::eq(client.memories(), client.memories()));
    }
}
