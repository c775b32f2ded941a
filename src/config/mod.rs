//! Configuration types for the Lara client.
//!
//! This module provides the `LaraConfig` type for configuring the Lara
//! client, including the service URL, credentials, SDK identification,
//! transport timeouts and polling behaviour.

use crate::credentials::{ChainCredentialsProvider, Credentials, CredentialsProvider, StaticCredentialsProvider};
use crate::error::{ConfigurationError, LaraError};
use crate::polling::PollConfig;
use crate::signing::SignatureDigest;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default service URL.
pub const DEFAULT_BASE_URL: &str = "https://api.laratranslate.com";

/// Default SDK name sent with every request.
pub const DEFAULT_SDK_NAME: &str = "lara-rust";

/// Environment variable overriding the service URL.
pub const LARA_BASE_URL: &str = "LARA_BASE_URL";

/// Environment variable selecting the signature digest.
pub const LARA_SIGNATURE_DIGEST: &str = "LARA_SIGNATURE_DIGEST";

/// Configuration for the Lara client.
#[derive(Clone)]
pub struct LaraConfig {
    /// Service URL.
    pub base_url: Url,

    /// Credentials provider; `None` sends requests unsigned.
    pub credentials_provider: Option<Arc<dyn CredentialsProvider>>,

    /// Digest used for request signatures.
    pub signature_digest: SignatureDigest,

    /// SDK name sent in `X-Lara-SDK-Name`.
    pub sdk_name: String,

    /// SDK version sent in `X-Lara-SDK-Version`.
    pub sdk_version: String,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Read timeout for individual requests.
    pub read_timeout: Duration,

    /// Maximum idle connections per host.
    pub max_connections: u32,

    /// Idle connection timeout.
    pub idle_timeout: Duration,

    /// Verify SSL certificates.
    pub verify_ssl: bool,

    /// First sleep between job status fetches.
    pub poll_initial_interval: Duration,

    /// Upper bound for the sleep between job status fetches.
    pub poll_max_interval: Duration,

    /// Ceiling for end-to-end document translation.
    pub document_timeout: Duration,
}

impl std::fmt::Debug for LaraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaraConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "credentials_provider",
                &self.credentials_provider.as_ref().map(|p| p.name()),
            )
            .field("signature_digest", &self.signature_digest)
            .field("sdk_name", &self.sdk_name)
            .field("sdk_version", &self.sdk_version)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("max_connections", &self.max_connections)
            .field("verify_ssl", &self.verify_ssl)
            .field("poll_initial_interval", &self.poll_initial_interval)
            .field("poll_max_interval", &self.poll_max_interval)
            .field("document_timeout", &self.document_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for LaraConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credentials_provider: Some(Arc::new(ChainCredentialsProvider::default())),
            signature_digest: SignatureDigest::default(),
            sdk_name: DEFAULT_SDK_NAME.to_string(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(60),
            max_connections: 32,
            idle_timeout: Duration::from_secs(90),
            verify_ssl: true,
            poll_initial_interval: Duration::from_millis(500),
            poll_max_interval: Duration::from_secs(2),
            document_timeout: Duration::from_secs(15 * 60),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

impl LaraConfig {
    /// Create a new configuration builder.
    pub fn builder() -> LaraConfigBuilder {
        LaraConfigBuilder::default()
    }

    /// Polling settings for a wait bounded by `max_wait` (zero waits
    /// indefinitely).
    pub fn poll_config(&self, max_wait: Duration) -> PollConfig {
        PollConfig::default()
            .with_initial_interval(self.poll_initial_interval)
            .with_max_interval(self.poll_max_interval)
            .with_max_wait(max_wait)
    }
}

/// Builder for Lara configuration.
#[derive(Default)]
pub struct LaraConfigBuilder {
    base_url: Option<String>,
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    unsigned: bool,
    signature_digest: Option<String>,
    sdk_name: Option<String>,
    sdk_version: Option<String>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    max_connections: Option<u32>,
    idle_timeout: Option<Duration>,
    verify_ssl: Option<bool>,
    poll_initial_interval: Option<Duration>,
    poll_max_interval: Option<Duration>,
    document_timeout: Option<Duration>,
}

impl LaraConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credentials provider.
    pub fn credentials_provider(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials_provider = Some(provider);
        self.unsigned = false;
        self
    }

    /// Use a fixed access key pair.
    pub fn credentials(self, credentials: Credentials) -> Self {
        self.credentials_provider(Arc::new(StaticCredentialsProvider::new(credentials)))
    }

    /// Send requests without signing them.
    pub fn unsigned(mut self) -> Self {
        self.credentials_provider = None;
        self.unsigned = true;
        self
    }

    /// Set the signature digest.
    pub fn signature_digest(mut self, digest: SignatureDigest) -> Self {
        self.signature_digest = Some(digest.as_str().to_string());
        self
    }

    /// Set the SDK name.
    pub fn sdk_name(mut self, name: impl Into<String>) -> Self {
        self.sdk_name = Some(name.into());
        self
    }

    /// Set the SDK version.
    pub fn sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = Some(version.into());
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    pub fn max_connections(mut self, connections: u32) -> Self {
        self.max_connections = Some(connections);
        self
    }

    /// Set the idle connection timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Enable or disable SSL verification.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Set the polling intervals.
    pub fn poll_intervals(mut self, initial: Duration, max: Duration) -> Self {
        self.poll_initial_interval = Some(initial);
        self.poll_max_interval = Some(max);
        self
    }

    /// Set the document translation ceiling.
    pub fn document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `LARA_BASE_URL` and `LARA_SIGNATURE_DIGEST`; values are
    /// validated by [`build`](Self::build).
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = std::env::var(LARA_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = Some(url);
            }
        }
        if let Ok(digest) = std::env::var(LARA_SIGNATURE_DIGEST) {
            if !digest.trim().is_empty() {
                self.signature_digest = Some(digest);
            }
        }
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<LaraConfig, LaraError> {
        let defaults = LaraConfig::default();

        let base_url = match self.base_url {
            Some(url) => parse_base_url(&url)?,
            None => defaults.base_url,
        };

        let signature_digest = match self.signature_digest {
            Some(digest) => digest.parse::<SignatureDigest>().map_err(|message| {
                ConfigurationError::InvalidConfiguration {
                    field: "signature_digest".to_string(),
                    message,
                }
            })?,
            None => defaults.signature_digest,
        };

        let sdk_name = self.sdk_name.unwrap_or(defaults.sdk_name);
        if sdk_name.trim().is_empty() {
            return Err(invalid("sdk_name", "SDK name must not be empty"));
        }

        let poll_initial_interval = self
            .poll_initial_interval
            .unwrap_or(defaults.poll_initial_interval);
        let poll_max_interval = self.poll_max_interval.unwrap_or(defaults.poll_max_interval);

        if poll_initial_interval.is_zero() {
            return Err(invalid(
                "poll_initial_interval",
                "Polling interval must be greater than zero",
            ));
        }
        if poll_max_interval < poll_initial_interval {
            return Err(invalid(
                "poll_max_interval",
                "Maximum polling interval must not be below the initial interval",
            ));
        }

        let credentials_provider = if self.unsigned {
            None
        } else {
            self.credentials_provider.or(defaults.credentials_provider)
        };

        Ok(LaraConfig {
            base_url,
            credentials_provider,
            signature_digest,
            sdk_name,
            sdk_version: self.sdk_version.unwrap_or(defaults.sdk_version),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            read_timeout: self.read_timeout.unwrap_or(defaults.read_timeout),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            idle_timeout: self.idle_timeout.unwrap_or(defaults.idle_timeout),
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
            poll_initial_interval,
            poll_max_interval,
            document_timeout: self.document_timeout.unwrap_or(defaults.document_timeout),
        })
    }
}

fn parse_base_url(url: &str) -> Result<Url, LaraError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ConfigurationError::InvalidBaseUrl {
        url: url.to_string(),
        details: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidBaseUrl {
            url: url.to_string(),
            details: format!("unsupported scheme '{}'", parsed.scheme()),
        }
        .into());
    }

    Ok(parsed)
}

fn invalid(field: &str, message: &str) -> LaraError {
    ConfigurationError::InvalidConfiguration {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}
