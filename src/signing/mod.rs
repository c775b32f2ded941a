//! Lara request signing.
//!
//! Every request is authenticated with an HMAC over a canonical string built
//! from the effective method, the request path, the body hash, the content
//! type and the `Date` header:
//!
//! ```text
//! METHOD\nPATH\nCONTENT_MD5\nCONTENT_TYPE\nDATE
//! ```
//!
//! The raw digest is base64-encoded and sent as
//! `Authorization: Lara <access_key_id>:<signature>`.

mod canonical;
mod signer;

pub use canonical::{build_canonical_string, normalize_content_type, normalize_method};
pub use signer::{LaraSigner, RequestSigner, SignedRequest};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme name.
pub const AUTHORIZATION_SCHEME: &str = "Lara";

/// Header carrying the signature.
pub const HEADER_AUTHORIZATION: &str = "authorization";
/// Header carrying the request timestamp.
pub const HEADER_DATE: &str = "date";
/// Header carrying the hex MD5 of the body.
pub const HEADER_CONTENT_MD5: &str = "content-md5";
/// Header carrying the body media type.
pub const HEADER_CONTENT_TYPE: &str = "content-type";
/// Header carrying the intended verb of a tunnelled request.
pub const HEADER_METHOD_OVERRIDE: &str = "x-http-method-override";

/// Digest used for the request HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureDigest {
    /// HMAC-SHA1.
    Sha1,
    /// HMAC-SHA256.
    #[default]
    Sha256,
}

impl SignatureDigest {
    /// Digest name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureDigest::Sha1 => "sha1",
            SignatureDigest::Sha256 => "sha256",
        }
    }

    /// Compute the HMAC of `data` keyed with `key`.
    pub fn hmac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            SignatureDigest::Sha1 => hmac_sha1(key, data),
            SignatureDigest::Sha256 => hmac_sha256(key, data),
        }
    }
}

impl std::str::FromStr for SignatureDigest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(SignatureDigest::Sha1),
            "sha256" => Ok(SignatureDigest::Sha256),
            other => Err(format!("unsupported signature digest '{}'", other)),
        }
    }
}

/// Calculate HMAC-SHA1.
pub fn hmac_sha1(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Calculate HMAC-SHA256.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Calculate the lower-case hex MD5 of a body.
pub fn content_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Format a timestamp for the `Date` header.
///
/// Returns e.g. `Fri, 15 Dec 2023 10:30:45 +0000`.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Sign the canonical components of a request with `secret`.
///
/// Absent components are passed as empty strings.
pub fn sign(
    secret: &str,
    method: &str,
    path: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    digest: SignatureDigest,
) -> String {
    let canonical = build_canonical_string(method, path, content_md5, content_type, date);
    let raw = digest.hmac(secret.as_bytes(), canonical.as_bytes());
    STANDARD.encode(raw)
}

/// Build the `Authorization` header value.
pub fn authorization_header(access_key_id: &str, signature: &str) -> String {
    format!("{} {}:{}", AUTHORIZATION_SCHEME, access_key_id, signature)
}
