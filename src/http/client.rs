//! Dispatcher implementation.

use super::request::{ApiRequest, HttpMethod};
use super::multipart::FilePart;
use super::{HEADER_SDK_NAME, HEADER_SDK_VERSION};
use crate::config::LaraConfig;
use crate::error::{ApiError, LaraError, ResponseError};
use crate::signing::{
    format_date, normalize_content_type, RequestSigner, HEADER_CONTENT_MD5, HEADER_CONTENT_TYPE,
    HEADER_DATE, HEADER_METHOD_OVERRIDE,
};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for the Lara REST API.
///
/// Shared by all services; holds no per-request state.
pub struct ApiClient {
    config: Arc<LaraConfig>,
    transport: Arc<dyn HttpTransport>,
    signer: Arc<dyn RequestSigner>,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(
        config: Arc<LaraConfig>,
        transport: Arc<dyn HttpTransport>,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            config,
            transport,
            signer,
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &LaraConfig {
        &self.config
    }

    /// Transport used for every request.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    /// Send a GET.
    pub async fn get(&self, path: &str) -> Result<Option<Value>, LaraError> {
        self.send(ApiRequest::get(path)).await
    }

    /// Send a POST with an optional body.
    pub async fn post(
        &self,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<Value>, LaraError> {
        self.request(HttpMethod::POST, path, body, Vec::new()).await
    }

    /// Send a PUT with an optional body.
    pub async fn put(
        &self,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<Value>, LaraError> {
        self.request(HttpMethod::PUT, path, body, Vec::new()).await
    }

    /// Send a DELETE with an optional body.
    pub async fn delete(
        &self,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<Value>, LaraError> {
        self.request(HttpMethod::DELETE, path, body, Vec::new()).await
    }

    /// Send a request and return the `content` of the response envelope.
    ///
    /// With `files` the body fields are sent as multipart form data.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Map<String, Value>>,
        files: Vec<FilePart>,
    ) -> Result<Option<Value>, LaraError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        for file in files {
            request = request.with_file(file);
        }
        self.send(request).await
    }

    /// Send a request whose successful response is not enveloped and return
    /// the raw body.
    pub async fn request_raw(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Map<String, Value>>,
    ) -> Result<Bytes, LaraError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let response = self.dispatch(&request).await?;
        Ok(response.body)
    }

    /// Send a prepared request and unwrap the response envelope.
    pub async fn send(&self, request: ApiRequest) -> Result<Option<Value>, LaraError> {
        let response = self.dispatch(&request).await?;
        parse_envelope(&response)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<HttpResponse, LaraError> {
        let http_request = self.build_http_request(request)?;

        debug!(
            method = %request.method(),
            path = request.path(),
            multipart = !request.files().is_empty(),
            "Dispatching Lara request"
        );

        let signed = self.signer.sign(http_request).await?;
        let response = self.transport.send(signed).await?;

        if !response.is_success() {
            let error = ApiError::from_body(response.status, &response.body);
            warn!(
                method = %request.method(),
                path = request.path(),
                status = error.status,
                error_type = %error.error_type,
                "Lara API error"
            );
            return Err(error.into());
        }

        Ok(response)
    }

    fn build_http_request(&self, request: &ApiRequest) -> Result<HttpRequest, LaraError> {
        let url = format!(
            "{}{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            request.path()
        );
        let encoded = request.encode()?;

        let mut http_request = HttpRequest::new("POST", url)
            .with_header(HEADER_METHOD_OVERRIDE, request.method().as_str())
            .with_header(HEADER_DATE, format_date(&Utc::now()))
            .with_header(HEADER_SDK_NAME, self.config.sdk_name.as_str())
            .with_header(HEADER_SDK_VERSION, self.config.sdk_version.as_str());

        if let Some(md5) = encoded.content_md5 {
            http_request = http_request.with_header(HEADER_CONTENT_MD5, md5);
        }
        if let Some(content_type) = encoded.content_type {
            http_request =
                http_request.with_header(HEADER_CONTENT_TYPE, normalize_content_type(&content_type));
        }
        if let Some(bytes) = encoded.bytes {
            http_request = http_request.with_body(bytes);
        }

        Ok(http_request)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Return the `content` field of a success envelope.
///
/// An empty body, a missing field and an explicit `null` all yield `None`.
fn parse_envelope(response: &HttpResponse) -> Result<Option<Value>, LaraError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let mut envelope: Value =
        serde_json::from_slice(&response.body).map_err(ResponseError::from)?;

    match envelope.get_mut("content").map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(content) => Ok(Some(content)),
    }
}

/// Deserialize envelope content into a model, failing when it is absent.
pub fn decode_content<T: DeserializeOwned>(
    content: Option<Value>,
    operation: &str,
) -> Result<T, LaraError> {
    let value = content.ok_or_else(|| ResponseError::EmptyContent {
        operation: operation.to_string(),
    })?;
    Ok(serde_json::from_value(value).map_err(ResponseError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::signing::{LaraSigner, HEADER_AUTHORIZATION};
    use serde_json::json;

    fn client(transport: Arc<MockTransport>) -> ApiClient {
        let config = Arc::new(LaraConfig::default());
        ApiClient::new(config, transport, Arc::new(LaraSigner::unsigned()))
    }

    #[tokio::test]
    async fn test_every_request_is_a_post_with_override() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(json!([]))));
        let client = client(transport.clone());

        client.get("/memories").await.unwrap();
        client.delete("memories/mem_1", None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].get_header(HEADER_METHOD_OVERRIDE), Some("GET"));
        assert!(requests[0].url.ends_with("/memories"));
        assert_eq!(requests[1].get_header(HEADER_METHOD_OVERRIDE), Some("DELETE"));
        assert!(requests[1].url.ends_with("/memories/mem_1"));
    }

    #[tokio::test]
    async fn test_sdk_and_date_headers_are_stamped() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(json!([]))));
        let client = client(transport.clone());

        client.get("/languages").await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.get_header(HEADER_SDK_NAME), Some("lara-rust"));
        assert_eq!(
            request.get_header(HEADER_SDK_VERSION),
            Some(env!("CARGO_PKG_VERSION"))
        );
        let date = request.get_header(HEADER_DATE).unwrap();
        assert!(date.ends_with(" +0000"));
        assert!(chrono::DateTime::parse_from_str(date, "%a, %d %b %Y %H:%M:%S %z").is_ok());
        assert!(request.get_header(HEADER_AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_content_md5_matches_transmitted_bytes() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(json!({}))));
        let client = client(transport.clone());

        let mut body = Map::new();
        body.insert("name".to_string(), json!("Demo"));
        body.insert("external_id".to_string(), Value::Null);
        client.post("/memories", Some(body)).await.unwrap();

        let request = transport.last_request().unwrap();
        let bytes = request.body.clone().unwrap();
        assert_eq!(&bytes[..], br#"{"name":"Demo"}"#);
        assert_eq!(
            request.get_header(HEADER_CONTENT_MD5),
            Some(crate::signing::content_md5(&bytes).as_str())
        );
        assert_eq!(request.get_header(HEADER_CONTENT_TYPE), Some("application/json"));
    }

    #[tokio::test]
    async fn test_content_is_unwrapped_one_level() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::json_content(json!({"content": "nested"})),
            MockResponse::ok_with_body(r#"{"content":null}"#),
            MockResponse::ok_with_body(r#"{"other":1}"#),
            MockResponse::ok(),
        ]));
        let client = client(transport);

        assert_eq!(
            client.get("/a").await.unwrap(),
            Some(json!({"content": "nested"}))
        );
        assert_eq!(client.get("/b").await.unwrap(), None);
        assert_eq!(client.get("/c").await.unwrap(), None);
        assert_eq!(client.get("/d").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::api_error(401, "AuthenticationError", "Invalid signature"),
            MockResponse::error(500, "oops"),
        ]));
        let client = client(transport);

        let err = client.get("/memories").await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.error_type(), Some("AuthenticationError"));

        let err = client.get("/memories").await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.error_type(), Some("UnknownError"));
    }

    #[tokio::test]
    async fn test_invalid_success_json_is_response_error() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::ok_with_body("not json")));
        let client = client(transport);

        let err = client.get("/memories").await.unwrap_err();
        assert!(matches!(err, LaraError::Response(_)));
    }

    #[tokio::test]
    async fn test_request_raw_returns_body_bytes() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::ok_with_body("a,b\n1,2\n")));
        let client = client(transport);

        let bytes = client
            .request_raw(HttpMethod::GET, "/glossaries/gls_1/export", None)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"a,b\n1,2\n");
    }

    #[test]
    fn test_decode_content() {
        let value: Vec<String> = decode_content(Some(json!(["en", "it"])), "languages").unwrap();
        assert_eq!(value, vec!["en", "it"]);

        let err = decode_content::<Vec<String>>(None, "languages").unwrap_err();
        assert!(matches!(
            err,
            LaraError::Response(ResponseError::EmptyContent { .. })
        ));
    }
}
