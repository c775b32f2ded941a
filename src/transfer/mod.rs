//! File transfer utilities.
//!
//! Reading upload sources from disk, gzip compression of bulk import payloads
//! and the unsigned object-storage side channel used for document bytes.

use crate::error::{LaraError, NetworkError};
use crate::http::{FilePart, MultipartBody};
use crate::signing::HEADER_CONTENT_TYPE;
use crate::transport::{HttpRequest, HttpTransport};
use bytes::Bytes;
use flate2::{read, write};
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Compression level applied to import payloads.
pub const IMPORT_COMPRESSION_LEVEL: u32 = 7;

/// Read a file into memory.
pub async fn read_file(path: impl AsRef<Path>) -> Result<Bytes, LaraError> {
    let data = tokio::fs::read(path.as_ref()).await?;
    Ok(Bytes::from(data))
}

/// Gzip `data` at the given level.
pub fn gzip(data: &[u8], level: u32) -> Result<Bytes, LaraError> {
    let mut encoder = write::GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder.write_all(data)?;
    Ok(Bytes::from(encoder.finish()?))
}

/// Read a file through a gzip encoder for import.
///
/// The file is compressed as it is read, on the blocking pool; only the
/// compressed payload is held in memory since it becomes a multipart part
/// whose form fields are hashed for `Content-MD5`.
pub async fn read_compressed(path: impl AsRef<Path>) -> Result<Bytes, LaraError> {
    let path = path.as_ref().to_path_buf();
    let compressed = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<u8>> {
        let reader = BufReader::new(File::open(&path)?);
        let mut encoder =
            read::GzEncoder::new(reader, Compression::new(IMPORT_COMPRESSION_LEVEL));
        let mut out = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(out)
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

    Ok(Bytes::from(compressed))
}

/// Final path component, or `fallback` when there is none.
pub fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
        .unwrap_or_else(|| fallback.to_string())
}

/// Client for pre-signed object-storage URLs.
///
/// Requests are sent unsigned and without Lara headers; the URL and form
/// fields carry their own authorisation.
pub struct ObjectStorage {
    transport: Arc<dyn HttpTransport>,
}

impl ObjectStorage {
    /// Create a new object-storage client.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// POST `fields` followed by the `file` part to `url`.
    pub async fn upload(
        &self,
        url: &str,
        fields: &[(String, String)],
        filename: &str,
        data: Bytes,
    ) -> Result<(), LaraError> {
        let file = FilePart::new("file", filename, data);
        let multipart = MultipartBody::from_text_fields(fields, std::slice::from_ref(&file));

        let request = HttpRequest::new("POST", url)
            .with_header(HEADER_CONTENT_TYPE, multipart.content_type())
            .with_body(multipart.into_bytes());

        debug!(url = strip_query(url), filename, "Uploading to object storage");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(NetworkError::TransferFailed {
                url: strip_query(url).to_string(),
                status: response.status,
            }
            .into());
        }

        Ok(())
    }

    /// GET the content at `url`.
    pub async fn download(&self, url: &str) -> Result<Bytes, LaraError> {
        debug!(url = strip_query(url), "Downloading from object storage");

        let response = self.transport.send(HttpRequest::new("GET", url)).await?;
        if !response.is_success() {
            return Err(NetworkError::TransferFailed {
                url: strip_query(url).to_string(),
                status: response.status,
            }
            .into());
        }

        Ok(response.body)
    }
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage").finish_non_exhaustive()
    }
}

// Pre-signed query strings carry credentials.
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use flate2::read::GzDecoder;

    #[test]
    fn test_gzip_round_trips() {
        let data = b"<tmx version=\"1.4\"></tmx>".repeat(50);
        let compressed = gzip(&data, IMPORT_COMPRESSION_LEVEL).unwrap();
        assert!(compressed.len() < data.len());

        let mut decoded = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[tokio::test]
    async fn test_read_compressed_streams_file() {
        let data = "source,target\nhello,ciao\n".repeat(200);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(data.as_bytes()).unwrap();

        let compressed = read_compressed(file.path()).await.unwrap();
        assert!(compressed.len() < data.len());

        let mut decoded = String::new();
        GzDecoder::new(&compressed[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[tokio::test]
    async fn test_read_compressed_missing_file_is_io_error() {
        let result = read_compressed("/definitely/not/here.tmx").await;
        assert!(matches!(result, Err(LaraError::Io(_))));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/report.docx"), "document"), "report.docx");
        assert_eq!(file_name(Path::new("/"), "document"), "document");
    }

    #[tokio::test]
    async fn test_upload_is_unsigned_multipart() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::no_content()));
        let storage = ObjectStorage::new(transport.clone());

        let fields = vec![("key".to_string(), "uploads/doc.txt".to_string())];
        storage
            .upload("https://bucket.example.com/", &fields, "doc.txt", Bytes::from("hello"))
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, "POST");
        assert!(request.get_header("authorization").is_none());
        assert!(request.get_header("x-lara-sdk-name").is_none());

        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        let key = body.find("name=\"key\"").unwrap();
        let file = body.find("name=\"file\"; filename=\"doc.txt\"").unwrap();
        assert!(key < file);
    }

    #[tokio::test]
    async fn test_transfer_failures_hide_query() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::error(403, "denied")));
        let storage = ObjectStorage::new(transport);

        let err = storage
            .download("https://bucket.example.com/doc.txt?X-Signature=secret")
            .await
            .unwrap_err();

        match err {
            LaraError::Network(NetworkError::TransferFailed { url, status }) => {
                assert_eq!(url, "https://bucket.example.com/doc.txt");
                assert_eq!(status, 403);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
