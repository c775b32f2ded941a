//! Signed request dispatch.
//!
//! Every Lara call goes through [`ApiClient`]: the request is encoded, stamped
//! with the SDK and date headers, signed, sent as a physical POST and the
//! response envelope is unwrapped or turned into an [`ApiError`].
//!
//! [`ApiError`]: crate::error::ApiError

mod client;
mod multipart;
mod request;

pub use client::{decode_content, ApiClient};
pub use multipart::{FilePart, MultipartBody};
pub use request::{strip_nulls, ApiRequest, EncodedBody, HttpMethod};

/// Header carrying the SDK name.
pub const HEADER_SDK_NAME: &str = "x-lara-sdk-name";

/// Header carrying the SDK version.
pub const HEADER_SDK_VERSION: &str = "x-lara-sdk-version";
