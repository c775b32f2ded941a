//! HTTP transport layer.
//!
//! The transport is the only component that opens connections. The signed
//! API dispatcher and the unsigned object-storage side channel both go
//! through it, so tests can swap the network for a queue of canned responses.

use crate::config::LaraConfig;
use crate::error::{LaraError, NetworkError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::trace;

/// Outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Physical HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Request headers, names compared case-insensitively.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header, replacing any header of the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header, replacing any header of the same name regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Header value by case-insensitive name.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Received HTTP response. Non-2xx statuses are values, not errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Full response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// 2xx status.
    pub fn is_success(&self) -> bool {
        http::StatusCode::from_u16(self.status)
            .map(|status| status.is_success())
            .unwrap_or(false)
    }

    /// Header value by case-insensitive name.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Sends requests over the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the complete response.
    ///
    /// Only failures to obtain a response are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LaraError>;
}

/// Transport backed by a pooled `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with the default client settings.
    pub fn new() -> Result<Self, LaraError> {
        Self::from_config(&LaraConfig::default())
    }

    /// Transport using the timeouts, pool and TLS settings of `config`.
    ///
    /// The user agent is `{sdk_name}/{sdk_version}`.
    pub fn from_config(config: &LaraConfig) -> Result<Self, LaraError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .pool_max_idle_per_host(config.max_connections as usize)
            .pool_idle_timeout(config.idle_timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("{}/{}", config.sdk_name, config.sdk_version))
            .build()
            .map_err(|e| NetworkError::TlsError {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LaraError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            NetworkError::ConnectionFailed {
                message: format!("Invalid HTTP method: {}", request.method),
            }
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(network_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await.map_err(network_error)?;

        trace!(status, bytes = body.len(), "Response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn network_error(e: reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout
    } else {
        NetworkError::ConnectionFailed {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}
