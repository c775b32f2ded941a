//! Error types for the Lara integration module.
//!
//! Errors are grouped by their source so callers can branch on them: local
//! configuration and credentials, the network, the remote API, and the
//! client-side polling ceiling.

use std::time::Duration;
use thiserror::Error;

/// Error type used when the service returns no `error.type`.
pub const UNKNOWN_ERROR_TYPE: &str = "UnknownError";

/// Message used when the service returns no `error.message`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Top-level error type for the Lara integration.
#[derive(Debug, Error)]
pub enum LaraError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Credential-related errors.
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// Network and transport errors.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Non-2xx response from the service.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Malformed success payloads.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// A polled job did not finish within the allowed time.
    #[error("Timed out after waiting {waited:?}")]
    Timeout {
        /// Time spent waiting before giving up.
        waited: Duration,
    },

    /// The service reported a terminal `error` status for a document.
    #[error("Document {document_id} failed: {reason}")]
    DocumentFailed {
        /// Document identifier.
        document_id: String,
        /// Reason reported by the service.
        reason: String,
    },

    /// Polling was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Local file errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LaraError {
    /// Returns the HTTP status code for API errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LaraError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns the service-defined error type for API errors.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            LaraError::Api(e) => Some(&e.error_type),
            _ => None,
        }
    }

    /// Returns true if this is an API error with status 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LaraError::Api(e) if e.is_not_found())
    }

    /// Returns true if this is a client-side polling timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LaraError::Timeout { .. })
    }
}

/// Error returned by the service for a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("(HTTP {status}) {error_type}: {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Service-defined error type, e.g. `AuthenticationError`.
    pub error_type: String,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Build an API error from a response body.
    ///
    /// The body is expected to be `{"error": {"type": ..., "message": ...}}`;
    /// missing or malformed pieces fall back to `UnknownError` and a generic
    /// message.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let error = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("error").cloned());

        let field = |name: &str| {
            error
                .as_ref()
                .and_then(|e| e.get(name))
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        Self {
            status,
            error_type: field("type").unwrap_or_else(|| UNKNOWN_ERROR_TYPE.to_string()),
            message: field("message").unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
        }
    }

    /// Returns true for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status == http::StatusCode::NOT_FOUND.as_u16()
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid base URL.
    #[error("Invalid base URL '{url}': {details}")]
    InvalidBaseUrl {
        /// The invalid URL.
        url: String,
        /// Details about the validation error.
        details: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfiguration {
        /// The configuration field name.
        field: String,
        /// Error message.
        message: String,
    },
}

/// Credential-related errors.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// No credentials could be found.
    #[error("Credentials not found: no credentials could be loaded from any source")]
    NotFound,

    /// Credentials are invalid.
    #[error("Invalid credentials: {message}")]
    Invalid {
        /// Details about why credentials are invalid.
        message: String,
    },

    /// Credentials file error.
    #[error("Profile error: {message}")]
    ProfileError {
        /// Details about the profile error.
        message: String,
    },
}

/// Network and transport errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message.
        message: String,
    },

    /// Request timed out at the HTTP layer.
    #[error("Request timed out")]
    Timeout,

    /// TLS or client construction error.
    #[error("TLS error: {message}")]
    TlsError {
        /// Error message.
        message: String,
    },

    /// Object-storage transfer failed with a non-2xx status.
    #[error("Transfer to {url} failed with HTTP {status}")]
    TransferFailed {
        /// Target URL without the query string.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

/// Response parsing errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// JSON could not be decoded into the expected model.
    #[error("Invalid JSON: {message}")]
    InvalidJson {
        /// Error message.
        message: String,
    },

    /// The `content` field was absent where a value is required.
    #[error("Empty response content for {operation}")]
    EmptyContent {
        /// Operation that expected content.
        operation: String,
    },

    /// Missing required field.
    #[error("Missing required field '{field}' in response")]
    MissingField {
        /// The missing field name.
        field: String,
    },
}

impl From<serde_json::Error> for ResponseError {
    fn from(e: serde_json::Error) -> Self {
        ResponseError::InvalidJson {
            message: e.to_string(),
        }
    }
}
