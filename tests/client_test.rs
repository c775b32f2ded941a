//! End-to-end tests against a local HTTP server.

use async_trait::async_trait;
use lara::signing::{content_md5, SignatureDigest, SignedRequest};
use lara::transport::ReqwestTransport;
use lara::types::Translation;
use lara::{
    Credentials, HttpRequest, HttpResponse, HttpTransport, LaraClient, LaraClientBuilder,
    LaraClientImpl, LaraConfig, LaraError, TranslateOptions,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
const ACCESS_KEY_SECRET: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

/// Sends through reqwest and keeps a copy of every outgoing request.
struct RecordingTransport {
    inner: ReqwestTransport,
    sent: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            inner: ReqwestTransport::new().unwrap(),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> HttpRequest {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LaraError> {
        self.sent.lock().unwrap().push(request.clone());
        self.inner.send(request).await
    }
}

async fn create_test_client(
    digest: SignatureDigest,
) -> (LaraClientImpl, Arc<RecordingTransport>, MockServer) {
    let mock_server = MockServer::start().await;
    let transport = Arc::new(RecordingTransport::new());

    let config = LaraConfig::builder()
        .base_url(mock_server.uri())
        .credentials(Credentials::new(ACCESS_KEY_ID, ACCESS_KEY_SECRET))
        .signature_digest(digest)
        .build()
        .unwrap();

    let client = LaraClientBuilder::new()
        .config(config)
        .transport(transport.clone())
        .build()
        .await
        .unwrap();

    (client, transport, mock_server)
}

fn assert_valid_signature(request: &HttpRequest, digest: SignatureDigest) {
    let expected = SignedRequest::compute(request, ACCESS_KEY_SECRET, digest).unwrap();
    assert_eq!(
        request.get_header("authorization"),
        Some(format!("Lara {}:{}", ACCESS_KEY_ID, expected.signature).as_str())
    );
}

#[tokio::test]
async fn test_translate_hello() {
    let (client, transport, mock_server) = create_test_client(SignatureDigest::Sha256).await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header("x-http-method-override", "POST"))
        .and(header("x-lara-sdk-name", "lara-rust"))
        .and(header_exists("x-lara-sdk-version"))
        .and(header_exists("authorization"))
        .and(header_exists("date"))
        .and(header_exists("content-md5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {
                "content_type": "text/plain",
                "source_language": "en-US",
                "translation": "Bonjour",
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client
        .translator()
        .translate("Hello", &TranslateOptions::new("fr-FR").with_source("en-US"))
        .await
        .unwrap();

    assert_eq!(result.translation, Translation::Text("Bonjour".to_string()));
    assert_eq!(result.source_language, "en-US");

    let request = transport.last();
    assert_valid_signature(&request, SignatureDigest::Sha256);
    assert_eq!(
        request.get_header("content-md5"),
        Some(content_md5(request.body.as_ref().unwrap()).as_str())
    );
    assert_eq!(request.get_header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_get_without_body_is_signed_without_md5() {
    let (client, transport, mock_server) = create_test_client(SignatureDigest::Sha1).await;

    Mock::given(method("POST"))
        .and(path("/languages"))
        .and(header("x-http-method-override", "GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": ["en-US", "it-IT"]})),
        )
        .mount(&mock_server)
        .await;

    let languages = client.translator().languages().await.unwrap();
    assert_eq!(languages, ["en-US", "it-IT"]);

    let request = transport.last();
    assert!(request.body.is_none());
    assert!(request.get_header("content-md5").is_none());
    assert_valid_signature(&request, SignatureDigest::Sha1);

    // Base64 of a 20-byte SHA-1 digest.
    let authorization = request.get_header("authorization").unwrap();
    let signature = authorization.rsplit(':').next().unwrap();
    assert_eq!(signature.len(), 28);
}

#[tokio::test]
async fn test_memory_not_found_is_none() {
    let (client, _transport, mock_server) = create_test_client(SignatureDigest::Sha256).await;

    Mock::given(method("POST"))
        .and(path("/memories/mem_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "NotFoundError", "message": "Memory not found"}
        })))
        .mount(&mock_server)
        .await;

    let memory = client.memories().get("mem_missing").await.unwrap();
    assert!(memory.is_none());
}

#[tokio::test]
async fn test_server_error_is_raised() {
    let (client, _transport, mock_server) = create_test_client(SignatureDigest::Sha256).await;

    Mock::given(method("POST"))
        .and(path("/memories"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"type": "InternalServerError", "message": "Something broke"}
        })))
        .mount(&mock_server)
        .await;

    let err = client.memories().list().await.unwrap_err();
    match err {
        LaraError::Api(api) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.error_type, "InternalServerError");
            assert_eq!(api.message, "Something broke");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unstructured_error_body_is_unknown_error() {
    let (client, _transport, mock_server) = create_test_client(SignatureDigest::Sha256).await;

    Mock::given(method("POST"))
        .and(path("/glossaries"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = client.glossaries().list().await.unwrap_err();
    assert_eq!(err.status_code(), Some(502));
    assert_eq!(err.error_type(), Some("UnknownError"));
}

#[tokio::test]
async fn test_memory_crud_scenario() {
    let (client, transport, mock_server) = create_test_client(SignatureDigest::Sha256).await;
    let memory = json!({
        "id": "mem_1",
        "name": "Demo",
        "owner_id": "acc_1",
        "created_at": "2024-01-15T10:30:00Z",
        "updated_at": "2024-01-15T10:30:00Z",
    });

    Mock::given(method("POST"))
        .and(path("/memories"))
        .and(header("x-http-method-override", "POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": memory})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/memories/mem_1"))
        .and(header("x-http-method-override", "DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": memory})))
        .mount(&mock_server)
        .await;

    let created = client.memories().create("Demo", None).await.unwrap();
    assert_eq!(created.id, "mem_1");

    let deleted = client.memories().delete("mem_1").await.unwrap();
    assert_eq!(deleted.name, "Demo");
    assert_valid_signature(&transport.last(), SignatureDigest::Sha256);
}
