//! Client side: attaching a signature to an outbound request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::{HeaderMap, HeaderValue, Request};

use crate::identity::{PrivateKey, Signature};

use super::canonical::{canonical_bytes, content_digest, DIGEST_HEADER, SIGNATURE_HEADER};
use super::RequestError;

/// Sign a request in place.
///
/// Sets `Content-MD5` from the body, signs the canonical bytes, and sets
/// `X-Signature`. Any certificate header must already be attached so that it
/// is covered by the signature.
pub fn sign_request<B: AsRef<[u8]>>(
    request: &mut Request<B>,
    private_key: &PrivateKey,
) -> Result<(), RequestError> {
    let digest = header_value(&content_digest(request.body().as_ref()))?;
    request.headers_mut().insert(DIGEST_HEADER, digest);

    let signature = sign_parts(
        request.method().as_str(),
        request_path(request),
        request.headers(),
        private_key,
    )?;

    let encoded = STANDARD.encode(signature.to_tagged().encode());
    request
        .headers_mut()
        .insert(SIGNATURE_HEADER, header_value(&encoded)?);
    Ok(())
}

/// Sign method, path and headers without touching a request object.
pub fn sign_parts(
    method: &str,
    path: &str,
    headers: &HeaderMap,
    private_key: &PrivateKey,
) -> Result<Signature, RequestError> {
    let message = canonical_bytes(method, path, headers)?;
    Ok(Signature::create(&message, private_key))
}

/// Path and query as signed; `/` when the URI has neither.
pub(crate) fn request_path<B>(request: &Request<B>) -> &str {
    request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str())
}

fn header_value(value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::from_str(value).map_err(|e| RequestError::Malformed(e.to_string()))
}
