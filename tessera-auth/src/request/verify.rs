//! Service side: re-deriving and verifying a request signature.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::{HeaderMap, Request};

use crate::identity::{PublicKey, Signature};
use crate::wire::TaggedBytes;

use super::canonical::{canonical_bytes, content_digest, DIGEST_HEADER, SIGNATURE_HEADER};
use super::sign::request_path;
use super::RequestError;

/// Verify a received request against the client's public key.
///
/// The key must come from an already-validated certificate.
///
/// # Errors
///
/// - `MissingSignature` if no `X-Signature` header is present
/// - `SignatureValidationFailed` if the declared body digest does not match the
///   body, a non-empty body carries no digest, or the signature does not verify
/// - `Malformed` if the signature header cannot be decoded
#[must_use = "verification result must be checked"]
pub fn verify_request<B: AsRef<[u8]>>(
    request: &Request<B>,
    public_key: &PublicKey,
) -> Result<(), RequestError> {
    let headers = request.headers();
    let signature = signature_from_headers(headers)?;

    let body = request.body().as_ref();
    match headers.get(DIGEST_HEADER) {
        Some(declared) => {
            if declared.as_bytes() != content_digest(body).as_bytes() {
                return Err(RequestError::SignatureValidationFailed);
            }
        }
        // An unsigned body could be swapped freely
        None if !body.is_empty() => return Err(RequestError::SignatureValidationFailed),
        None => {}
    }

    verify_parts(
        request.method().as_str(),
        request_path(request),
        headers,
        &signature,
        public_key,
    )
}

/// Verify a signature over method, path and headers.
pub fn verify_parts(
    method: &str,
    path: &str,
    headers: &HeaderMap,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<(), RequestError> {
    let message = canonical_bytes(method, path, headers)?;
    if !public_key.verify(&message, signature) {
        return Err(RequestError::SignatureValidationFailed);
    }
    Ok(())
}

/// Decode the `X-Signature` header.
pub fn signature_from_headers(headers: &HeaderMap) -> Result<Signature, RequestError> {
    let value = headers
        .get(SIGNATURE_HEADER)
        .ok_or(RequestError::MissingSignature)?;
    let raw = STANDARD
        .decode(value.as_bytes())
        .map_err(|_| RequestError::Malformed("signature is not base64".to_string()))?;
    let tagged = TaggedBytes::decode(&raw).map_err(|e| RequestError::Malformed(e.to_string()))?;
    Signature::from_tagged(&tagged).map_err(|e| RequestError::Malformed(e.to_string()))
}
