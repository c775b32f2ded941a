//! Request signer implementation.

use super::*;
use crate::credentials::CredentialsProvider;
use crate::error::{ConfigurationError, LaraError};
use crate::transport::HttpRequest;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// The canonical components of a request together with their signature.
///
/// Built per call from the outgoing request and discarded after sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Effective method (the override header value when present).
    pub method: String,
    /// Request path including the query string, without host.
    pub path: String,
    /// Hex MD5 of the body, empty when there is no body.
    pub content_md5: String,
    /// Normalized content type, empty when absent.
    pub content_type: String,
    /// Value of the `Date` header.
    pub timestamp: String,
    /// Base64 HMAC of the canonical string.
    pub signature: String,
}

impl SignedRequest {
    /// Compute the signature for `request` with `secret`.
    pub fn compute(
        request: &HttpRequest,
        secret: &str,
        digest: SignatureDigest,
    ) -> Result<Self, LaraError> {
        let method = normalize_method(
            request
                .get_header(HEADER_METHOD_OVERRIDE)
                .unwrap_or(&request.method),
        );
        let path = request_path(&request.url)?;
        let content_md5 = request.get_header(HEADER_CONTENT_MD5).unwrap_or("").trim().to_string();
        let content_type =
            normalize_content_type(request.get_header(HEADER_CONTENT_TYPE).unwrap_or(""));
        let timestamp = request.get_header(HEADER_DATE).unwrap_or("").trim().to_string();

        let signature = sign(
            secret,
            &method,
            &path,
            &content_md5,
            &content_type,
            &timestamp,
            digest,
        );

        Ok(Self {
            method,
            path,
            content_md5,
            content_type,
            timestamp,
            signature,
        })
    }

    /// The canonical string this signature was computed over.
    pub fn canonical_string(&self) -> String {
        build_canonical_string(
            &self.method,
            &self.path,
            &self.content_md5,
            &self.content_type,
            &self.timestamp,
        )
    }
}

/// Extract `path[?query]` from a full URL.
fn request_path(url: &str) -> Result<String, LaraError> {
    let parsed = Url::parse(url).map_err(|e| ConfigurationError::InvalidBaseUrl {
        url: url.to_string(),
        details: e.to_string(),
    })?;

    Ok(match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    })
}

/// Trait for request signers.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Attach authentication to `request` and return it.
    async fn sign(&self, request: HttpRequest) -> Result<HttpRequest, LaraError>;
}

/// Signer producing `Authorization: Lara <id>:<signature>` headers.
///
/// Without a credentials provider requests pass through unsigned, which is
/// how unauthenticated endpoints are reached.
pub struct LaraSigner {
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    digest: SignatureDigest,
}

impl LaraSigner {
    /// Create a new signer.
    pub fn new(
        credentials_provider: Option<Arc<dyn CredentialsProvider>>,
        digest: SignatureDigest,
    ) -> Self {
        Self {
            credentials_provider,
            digest,
        }
    }

    /// Create a signer that never signs.
    pub fn unsigned() -> Self {
        Self::new(None, SignatureDigest::default())
    }

    /// Digest used for signatures.
    pub fn digest(&self) -> SignatureDigest {
        self.digest
    }
}

#[async_trait]
impl RequestSigner for LaraSigner {
    async fn sign(&self, mut request: HttpRequest) -> Result<HttpRequest, LaraError> {
        let provider = match &self.credentials_provider {
            Some(provider) => provider,
            None => return Ok(request),
        };

        let credentials = provider.get_credentials().await?;
        let signed = SignedRequest::compute(&request, credentials.access_key_secret(), self.digest)?;

        request.set_header(
            HEADER_AUTHORIZATION,
            authorization_header(credentials.access_key_id(), &signed.signature),
        );

        Ok(request)
    }
}

impl std::fmt::Debug for LaraSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaraSigner")
            .field(
                "credentials_provider",
                &self.credentials_provider.as_ref().map(|p| p.name()),
            )
            .field("digest", &self.digest)
            .finish()
    }
}
