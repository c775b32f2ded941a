//! Types used throughout the Lara integration.
//!
//! Resource snapshots returned by the service, request parameters and the
//! shaped results of text translation.

mod common;
mod requests;
mod responses;

pub use common::*;
pub use requests::*;
pub use responses::*;
