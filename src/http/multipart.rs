//! Multipart form data encoding.

use bytes::Bytes;
use serde_json::{Map, Value};

/// A binary part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub filename: String,
    /// Part content type.
    pub content_type: String,
    /// Part content.
    pub data: Bytes,
}

impl FilePart {
    /// Create a binary part with `application/octet-stream` content.
    pub fn new(name: impl Into<String>, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            content_type: "application/octet-stream".to_string(),
            data: data.into(),
        }
    }

    /// Override the part content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// An encoded multipart body and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    /// Encode `fields` as text parts followed by `files` as binary parts.
    ///
    /// String values are written verbatim, other values as compact JSON.
    pub fn new(fields: &Map<String, Value>, files: &[FilePart]) -> Self {
        let pairs: Vec<(String, String)> = fields
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect();

        Self::from_text_fields(&pairs, files)
    }

    /// Encode plain text fields followed by `files`, preserving field order.
    pub fn from_text_fields(fields: &[(String, String)], files: &[FilePart]) -> Self {
        let boundary = format!("----lara_boundary_{}", uuid::Uuid::new_v4().simple());
        let mut body = Vec::new();

        for (name, value) in fields {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    quote_param(name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        for file in files {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    quote_param(&file.name),
                    quote_param(&file.filename)
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
            body.extend_from_slice(&file.data);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        Self { boundary, body }
    }

    /// Boundary separating the parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Consume into the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.body)
    }
}

/// Percent-encodes `"`, CR and LF so a value stays inside its quoted
/// `Content-Disposition` parameter.
fn quote_param(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("%22"),
            '\r' => quoted.push_str("%0D"),
            '\n' => quoted.push_str("%0A"),
            other => quoted.push(other),
        }
    }
    quoted
}
