//! Mock HTTP transport for testing.

use crate::error::{LaraError, NetworkError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};

/// Canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Response with an arbitrary status and body.
    pub fn error(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// 200 with an empty body.
    pub fn ok() -> Self {
        Self::error(200, Bytes::new())
    }

    /// 200 with `body`.
    pub fn ok_with_body(body: impl Into<Bytes>) -> Self {
        Self::error(200, body)
    }

    /// 204 with an empty body.
    pub fn no_content() -> Self {
        Self::error(204, Bytes::new())
    }

    /// 200 carrying `{"content": content}`.
    pub fn json_content(content: Value) -> Self {
        Self::ok_with_body(json!({ "content": content }).to_string())
            .with_header("content-type", "application/json")
    }

    /// Error envelope `{"error": {"type", "message"}}` with `status`.
    pub fn api_error(status: u16, error_type: &str, message: &str) -> Self {
        Self::error(
            status,
            json!({ "error": { "type": error_type, "message": message } }).to_string(),
        )
        .with_header("content-type", "application/json")
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Builder collecting responses in the order they will be served.
#[derive(Debug, Default)]
pub struct MockResponseBuilder {
    responses: Vec<MockResponse>,
    fallback: Option<MockResponse>,
}

impl MockResponseBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` next.
    pub fn respond(mut self, response: MockResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Serve `response` once the queue is drained.
    pub fn otherwise(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Build the transport.
    pub fn build(self) -> MockTransport {
        MockTransport {
            queue: Mutex::new(self.responses.into()),
            fallback: self.fallback,
            recorded: Mutex::new(Vec::new()),
        }
    }
}

/// Transport serving queued responses and recording every request.
///
/// Queued responses are served first, then the fallback; with neither left
/// the send fails with a connection error.
pub struct MockTransport {
    queue: Mutex<VecDeque<MockResponse>>,
    fallback: Option<MockResponse>,
    recorded: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Transport with nothing to serve.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Transport serving `responses` in order.
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        MockResponseBuilder {
            responses,
            fallback: None,
        }
        .build()
    }

    /// Transport serving `response` for every request.
    pub fn with_default(response: MockResponse) -> Self {
        Self::builder().otherwise(response).build()
    }

    /// Create a builder.
    pub fn builder() -> MockResponseBuilder {
        MockResponseBuilder::new()
    }

    /// Append a response to the queue.
    pub fn queue_response(&self, response: MockResponse) {
        self.queue.lock().push_back(response);
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.recorded.lock().clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.recorded.lock().len()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.recorded.lock().last().cloned()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.recorded.lock().clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LaraError> {
        self.recorded.lock().push(request);

        let next = self.queue.lock().pop_front().or_else(|| self.fallback.clone());
        let mock = next.ok_or_else(|| NetworkError::ConnectionFailed {
            message: "No mock response available".to_string(),
        })?;

        Ok(HttpResponse {
            status: mock.status,
            headers: mock.headers,
            body: mock.body,
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued_responses", &self.queue.lock().len())
            .field("recorded_requests", &self.recorded.lock().len())
            .finish()
    }
}
