//! Lara Translate Integration Module
//!
//! Type-safe client for the Lara translation service.
//!
//! # Features
//!
//! - **Text translation**: plain strings, string lists and text blocks with
//!   memory adaptation, glossaries and instructions
//! - **Memories and glossaries**: CRUD, TMX/CSV imports with progress polling
//! - **Documents**: upload, status polling and download through pre-signed
//!   object-storage URLs
//! - **Request signing**: HMAC request authentication with pluggable
//!   credential providers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lara::{LaraClient, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lara::LaraError> {
//!     // Reads LARA_ACCESS_KEY_ID / LARA_ACCESS_KEY_SECRET
//!     let client = lara::create_client_from_env().await?;
//!
//!     let result = client
//!         .translator()
//!         .translate("Hello, world!", &TranslateOptions::new("it-IT").with_source("en-US"))
//!         .await?;
//!
//!     println!("{}", result.translation.as_text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod mocks;
pub mod polling;
pub mod services;
pub mod signing;
pub mod transfer;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use client::{LaraClient, LaraClientBuilder, LaraClientImpl};
pub use config::LaraConfig;
pub use credentials::{
    ChainCredentialsProvider, Credentials, CredentialsProvider, EnvCredentialsProvider,
    ProfileCredentialsProvider, StaticCredentialsProvider,
};
pub use error::{
    ApiError, ConfigurationError, CredentialsError, LaraError, NetworkError, ResponseError,
};
pub use polling::{PollConfig, UpdateCallback};
pub use services::{
    Connected, DocumentsService, GlossariesService, MemoriesService, TranslatorService,
};
pub use signing::{LaraSigner, RequestSigner, SignatureDigest};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};
pub use types::{
    // Request types
    DocumentUploadOptions,
    GlossaryExportFormat,
    IdSelector,
    Priority,
    TranslateInput,
    TranslateOptions,
    TranslationUnit,
    UseCache,
    // Response types
    DetectResult,
    GlossaryMatch,
    Matches,
    MemoryMatch,
    TextResult,
    Translation,
    // Common types
    Document,
    DocumentStatus,
    Glossary,
    GlossaryCounts,
    ImportJob,
    Memory,
    TextBlock,
};

/// Create a new Lara client from environment variables.
///
/// This will attempt to read configuration from:
/// - `LARA_ACCESS_KEY_ID` and `LARA_ACCESS_KEY_SECRET` for credentials
/// - `LARA_PROFILE` / `LARA_CREDENTIALS_FILE` for profile credentials
/// - `LARA_BASE_URL` for a custom endpoint
/// - `LARA_SIGNATURE_DIGEST` (`sha256` or `sha1`)
///
/// Credentials are resolved before this returns, so a missing key pair is
/// reported here rather than on the first request.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> Result<(), lara::LaraError> {
/// let client = lara::create_client_from_env().await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_client_from_env() -> Result<impl LaraClient> {
    LaraClientBuilder::new().from_env().build().await
}

/// Create a new Lara client with explicit configuration.
///
/// # Example
///
/// ```rust,no_run
/// use lara::{Credentials, LaraConfig};
///
/// # async fn example() -> Result<(), lara::LaraError> {
/// let config = LaraConfig::builder()
///     .credentials(Credentials::new("ACCESS_KEY_ID", "ACCESS_KEY_SECRET"))
///     .build()?;
///
/// let client = lara::create_client(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_client(config: LaraConfig) -> Result<impl LaraClient> {
    LaraClientBuilder::new().config(config).build().await
}

/// Result type alias for Lara operations.
pub type Result<T> = std::result::Result<T, LaraError>;
