//! Documents service for file translation.
//!
//! Document bytes never pass through the Lara API: uploads and downloads go
//! to pre-signed object-storage URLs handed out by the service.

use super::memories::object;
use crate::config::LaraConfig;
use crate::error::{LaraError, ResponseError};
use crate::http::{decode_content, ApiClient, HttpMethod};
use crate::polling::{Poller, UpdateCallback};
use crate::transfer::{self, ObjectStorage};
use crate::types::{Document, DocumentStatus, DocumentUploadOptions, DownloadUrl, UploadUrl};
use bytes::Bytes;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Reason reported when a failed document carries none.
const UNKNOWN_FAILURE_REASON: &str = "unknown error";

/// Service for document translation.
pub struct DocumentsService {
    client: Arc<ApiClient>,
    config: Arc<LaraConfig>,
    storage: ObjectStorage,
}

impl DocumentsService {
    /// Create a new documents service.
    pub fn new(client: Arc<ApiClient>, config: Arc<LaraConfig>) -> Self {
        let storage = ObjectStorage::new(client.transport());
        Self {
            client,
            config,
            storage,
        }
    }

    /// Upload a file and submit it for translation.
    ///
    /// `filename` defaults to the last component of `path`.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        filename: Option<&str>,
        options: &DocumentUploadOptions,
    ) -> Result<Document, LaraError> {
        let path = path.as_ref();
        let filename = filename
            .map(String::from)
            .unwrap_or_else(|| transfer::file_name(path, "document"));
        let data = transfer::read_file(path).await?;

        self.upload_bytes(&filename, data, options).await
    }

    /// Upload in-memory content and submit it for translation.
    pub async fn upload_bytes(
        &self,
        filename: &str,
        data: Bytes,
        options: &DocumentUploadOptions,
    ) -> Result<Document, LaraError> {
        let body = object(json!({ "filename": filename }));
        let content = self.client.post("/documents/upload-url", Some(body)).await?;
        let upload: UploadUrl = decode_content(content, "documents.upload_url")?;

        let key = upload
            .key()
            .ok_or_else(|| ResponseError::MissingField {
                field: "fields.key".to_string(),
            })?
            .to_string();

        self.storage
            .upload(&upload.url, &upload.text_fields(), filename, data)
            .await?;

        let body = object(json!({
            "source": options.source,
            "target": options.target,
            "s3key": key,
            "adapt_to": options.adapt_to,
            "glossaries": options.glossaries,
        }));
        let content = self.client.post("/documents", Some(body)).await?;
        let document: Document = decode_content(content, "documents.create")?;

        debug!(document_id = %document.id, filename, "Document submitted");
        Ok(document)
    }

    /// Current snapshot of a document.
    pub async fn status(&self, id: &str) -> Result<Document, LaraError> {
        let content = self.client.get(&format!("/documents/{}", id)).await?;
        decode_content(content, "documents.status")
    }

    /// Download the translated content of a document.
    pub async fn download(&self, id: &str, output_format: Option<&str>) -> Result<Bytes, LaraError> {
        let body = object(json!({ "output_format": output_format }));
        let content = self
            .client
            .request(
                HttpMethod::GET,
                &format!("/documents/{}/download-url", id),
                Some(body),
                Vec::new(),
            )
            .await?;
        let target: DownloadUrl = decode_content(content, "documents.download_url")?;

        self.storage.download(&target.url).await
    }

    /// Wait until a document reaches `translated` or `error`.
    ///
    /// `max_wait` of zero waits indefinitely. The terminal snapshot is
    /// returned as is; an `error` status is not turned into an error here.
    pub async fn wait_for_translation(
        &self,
        document: &Document,
        on_update: Option<UpdateCallback<'_, Document>>,
        max_wait: Duration,
    ) -> Result<Document, LaraError> {
        let poller = Poller::new(self.config.poll_config(max_wait));
        let id = document.id.as_str();

        poller
            .wait_for(|| self.status(id), |d| d.status.is_terminal(), on_update)
            .await
    }

    /// Upload a file, wait for its translation and download the result.
    ///
    /// Bounded by the configured document timeout.
    pub async fn translate(
        &self,
        path: impl AsRef<Path>,
        filename: Option<&str>,
        options: &DocumentUploadOptions,
    ) -> Result<Bytes, LaraError> {
        let document = self.upload(path, filename, options).await?;
        let document = self
            .wait_for_translation(&document, None, self.config.document_timeout)
            .await?;

        match document.status {
            DocumentStatus::Translated => {
                self.download(&document.id, options.output_format.as_deref())
                    .await
            }
            _ => {
                let reason = document
                    .error_reason
                    .unwrap_or_else(|| UNKNOWN_FAILURE_REASON.to_string());
                warn!(document_id = %document.id, reason = %reason, "Document translation failed");
                Err(LaraError::DocumentFailed {
                    document_id: document.id,
                    reason,
                })
            }
        }
    }
}

impl std::fmt::Debug for DocumentsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentsService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport, TestFixtures};
    use crate::signing::LaraSigner;
    use serde_json::Value;

    fn service(transport: Arc<MockTransport>) -> DocumentsService {
        let config = Arc::new(LaraConfig::default());
        let client = Arc::new(ApiClient::new(
            config.clone(),
            transport,
            Arc::new(LaraSigner::unsigned()),
        ));
        DocumentsService::new(client, config)
    }

    #[tokio::test]
    async fn test_upload_bytes_flow() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::json_content(TestFixtures::upload_url_json()),
            MockResponse::no_content(),
            MockResponse::json_content(TestFixtures::document_json("doc_1", "initialized")),
        ]));
        let service = service(transport.clone());

        let options = DocumentUploadOptions::new("it-IT").with_source("en-US");
        let document = service
            .upload_bytes("report.txt", Bytes::from("Hello"), &options)
            .await
            .unwrap();

        assert_eq!(document.status, DocumentStatus::Initialized);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].url.ends_with("/documents/upload-url"));
        assert_eq!(requests[1].url, TestFixtures::UPLOAD_URL);
        assert!(requests[1].get_header("x-http-method-override").is_none());

        let body: Value = serde_json::from_slice(requests[2].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["s3key"], json!("uploads/doc_key/report.txt"));
        assert_eq!(body["target"], json!("it-IT"));
        assert!(body.get("glossaries").is_none());
    }

    #[tokio::test]
    async fn test_upload_requires_storage_key() {
        let transport = Arc::new(MockTransport::with_responses(vec![MockResponse::json_content(
            json!({"url": "https://bucket.example.com/", "fields": {}}),
        )]));
        let service = service(transport);

        let err = service
            .upload_bytes("a.txt", Bytes::from("x"), &DocumentUploadOptions::new("it-IT"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaraError::Response(ResponseError::MissingField { .. })));
    }

    #[tokio::test]
    async fn test_status_not_found_propagates() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::api_error(
            404,
            "NotFoundError",
            "Document not found",
        )));
        let service = service(transport);

        let err = service.status("doc_missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_download_fetches_presigned_url() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::json_content(json!({"url": TestFixtures::DOWNLOAD_URL})),
            MockResponse::ok_with_body("Ciao"),
        ]));
        let service = service(transport.clone());

        let bytes = service.download("doc_1", Some("pdf")).await.unwrap();

        assert_eq!(&bytes[..], b"Ciao");
        let requests = transport.requests();
        let body: Value = serde_json::from_slice(requests[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"output_format": "pdf"}));
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].url, TestFixtures::DOWNLOAD_URL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_translation_keeps_waiting_when_paused() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::json_content(TestFixtures::document_json("doc_1", "paused")),
            MockResponse::json_content(TestFixtures::document_json("doc_1", "ready")),
            MockResponse::json_content(TestFixtures::document_json("doc_1", "translated")),
        ]));
        let service = service(transport);
        let document: Document =
            serde_json::from_value(TestFixtures::document_json("doc_1", "initialized")).unwrap();

        let done = service
            .wait_for_translation(&document, None, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(done.status, DocumentStatus::Translated);
    }
}
