//! Mock implementations for testing.
//!
//! A queued-response transport plus JSON fixtures shaped like Lara API
//! payloads.

mod transport;

pub use transport::{MockResponse, MockResponseBuilder, MockTransport};

use serde_json::{json, Value};

/// Test fixtures for Lara payloads.
pub struct TestFixtures;

impl TestFixtures {
    /// Pre-signed upload URL used by [`TestFixtures::upload_url_json`].
    pub const UPLOAD_URL: &'static str = "https://lara-uploads.example.com/";

    /// Pre-signed download URL.
    pub const DOWNLOAD_URL: &'static str =
        "https://lara-downloads.example.com/doc_1/report.txt?X-Amz-Signature=abc";

    /// Memory object.
    pub fn memory_json(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "owner_id": "acc_1",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z",
            "collaborators_count": 0,
        })
    }

    /// Glossary object.
    pub fn glossary_json(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "owner_id": "acc_1",
            "created_at": "2024-02-01T08:00:00Z",
            "updated_at": "2024-02-01T08:00:00Z",
        })
    }

    /// Import job at the given progress.
    pub fn import_job_json(id: &str, progress: f64) -> Value {
        json!({
            "id": id,
            "begin": 0,
            "end": 42,
            "channel": 1,
            "size": 2048,
            "progress": progress,
        })
    }

    /// `/translate` payload with the given translation.
    pub fn text_result_json(translation: Value) -> Value {
        json!({
            "content_type": "text/plain",
            "source_language": "en-US",
            "translation": translation,
        })
    }

    /// Document in the given status.
    pub fn document_json(id: &str, status: &str) -> Value {
        let mut document = json!({
            "id": id,
            "status": status,
            "source": "en-US",
            "target": "it-IT",
            "filename": "report.txt",
            "created_at": "2024-03-10T12:00:00Z",
            "updated_at": "2024-03-10T12:00:05Z",
        });
        if status == "error" {
            document["error_reason"] = json!("Unsupported file format");
        }
        document
    }

    /// Upload target with a storage key.
    pub fn upload_url_json() -> Value {
        json!({
            "url": Self::UPLOAD_URL,
            "fields": {
                "key": "uploads/doc_key/report.txt",
                "policy": "eyJleHBpcmF0aW9uIjoiMjAyNCJ9",
                "x-amz-signature": "0f1e2d",
            },
        })
    }
}
