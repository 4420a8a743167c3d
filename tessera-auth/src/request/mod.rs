//! Per-request signing and verification.
//!
//! The client signs a canonical encoding of the request line plus an
//! allow-list of headers; the service rebuilds the same bytes from what it
//! received and checks the signature against the client key in the
//! caller's certificate.

mod canonical;
mod error;
mod sign;
mod verify;

pub use canonical::{
    canonical_bytes, content_digest, CERTIFICATE_HEADER, DATE_HEADER, DIGEST_HEADER, RANGE_HEADER,
    SIGNATURE_HEADER, SIGNED_HEADERS,
};
pub use error::RequestError;
pub use sign::{sign_parts, sign_request};
pub use verify::{signature_from_headers, verify_parts, verify_request};
