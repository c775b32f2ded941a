//! Request building for the Lara API.
//!
//! An [`ApiRequest`] carries the intended verb, the API path, an optional JSON
//! object body and optional file parts. Encoding happens in one place so the
//! bytes that are hashed are always the bytes that are sent.

use super::multipart::{FilePart, MultipartBody};
use crate::error::{LaraError, ResponseError};
use crate::signing::content_md5;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

/// Verbs accepted by the Lara API.
///
/// All of them travel as a physical POST; the verb itself is carried in the
/// method override header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    GET,
    /// POST request
    POST,
    /// PUT request
    PUT,
    /// DELETE request
    DELETE,
}

impl HttpMethod {
    /// Method name as sent in the override header.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the Lara API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    body: Option<Map<String, Value>>,
    files: Vec<FilePart>,
}

impl ApiRequest {
    /// Create a request for `path`, which is normalised to start with `/`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };

        Self {
            method,
            path,
            body: None,
            files: Vec::new(),
        }
    }

    /// Create a new GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    /// Create a new POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    /// Create a new PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::PUT, path)
    }

    /// Create a new DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::DELETE, path)
    }

    /// Set the body from a JSON object map.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the body from any value serialising to a JSON object.
    pub fn with_json<T: Serialize>(self, body: &T) -> Result<Self, LaraError> {
        match serde_json::to_value(body).map_err(ResponseError::from)? {
            Value::Object(map) => Ok(self.with_body(map)),
            Value::Null => Ok(self),
            other => Err(ResponseError::InvalidJson {
                message: format!("request body must be a JSON object, got {}", other),
            }
            .into()),
        }
    }

    /// Set a single body field. `null` values are kept here and dropped at
    /// encoding time.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Attach a file; the request is then sent as multipart form data.
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    /// Intended verb.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Normalised API path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Body fields as given.
    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    /// Attached files.
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Encode the body for transmission.
    pub fn encode(&self) -> Result<EncodedBody, LaraError> {
        let fields = self.body.as_ref().map(strip_nulls).unwrap_or_default();

        let content_md5 = if fields.is_empty() {
            None
        } else {
            Some(content_md5(&encode_json(&fields)?))
        };

        if !self.files.is_empty() {
            let multipart = MultipartBody::new(&fields, &self.files);
            return Ok(EncodedBody {
                content_type: Some(multipart.content_type()),
                bytes: Some(multipart.into_bytes()),
                content_md5,
            });
        }

        if fields.is_empty() {
            return Ok(EncodedBody::default());
        }

        let bytes = encode_json(&fields)?;
        Ok(EncodedBody {
            bytes: Some(Bytes::from(bytes)),
            content_type: Some("application/json".to_string()),
            content_md5,
        })
    }
}

/// An encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBody {
    /// Bytes to transmit.
    pub bytes: Option<Bytes>,
    /// Media type of `bytes`.
    pub content_type: Option<String>,
    /// Hex MD5 of the JSON encoding of the body fields.
    pub content_md5: Option<String>,
}

/// Drop top-level `null` fields.
pub fn strip_nulls(body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Compact JSON, non-ASCII left unescaped, keys in map order.
fn encode_json(fields: &Map<String, Value>) -> Result<Vec<u8>, LaraError> {
    Ok(serde_json::to_vec(fields).map_err(ResponseError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_is_normalised() {
        assert_eq!(ApiRequest::get("memories").path(), "/memories");
        assert_eq!(ApiRequest::get("/memories").path(), "/memories");
    }

    #[test]
    fn test_nulls_are_stripped_before_hashing() {
        let request = ApiRequest::post("/memories")
            .with_field("name", "Demo")
            .with_field("external_id", Value::Null);

        let encoded = request.encode().unwrap();
        let bytes = encoded.bytes.unwrap();

        assert_eq!(&bytes[..], br#"{"name":"Demo"}"#);
        assert_eq!(encoded.content_md5, Some(content_md5(&bytes)));
        assert_eq!(encoded.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_empty_body_has_no_md5() {
        let encoded = ApiRequest::get("/memories").encode().unwrap();
        assert_eq!(encoded, EncodedBody::default());

        let encoded = ApiRequest::get("/memories")
            .with_field("only", Value::Null)
            .encode()
            .unwrap();
        assert!(encoded.bytes.is_none());
        assert!(encoded.content_md5.is_none());
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let encoded = ApiRequest::post("/translate")
            .with_field("q", "Größe")
            .encode()
            .unwrap();
        assert_eq!(
            std::str::from_utf8(&encoded.bytes.unwrap()).unwrap(),
            r#"{"q":"Größe"}"#
        );
    }

    #[test]
    fn test_with_json_requires_object() {
        let request = ApiRequest::post("/x").with_json(&json!({"a": 1})).unwrap();
        assert_eq!(request.body().unwrap().get("a"), Some(&json!(1)));

        assert!(ApiRequest::post("/x").with_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_multipart_md5_covers_form_fields() {
        let request = ApiRequest::post("/memories/mem_1/import")
            .with_field("compression", "gzip")
            .with_file(FilePart::new("tmx", "memory.tmx.gz", b"data".to_vec()));

        let encoded = request.encode().unwrap();

        assert_eq!(
            encoded.content_md5,
            Some(content_md5(br#"{"compression":"gzip"}"#))
        );
        assert!(encoded
            .content_type
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
    }
}
