//! Canonical request bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::HeaderMap;

use crate::wire::write_prefixed;

use super::RequestError;

/// Header carrying the base64 client certificate.
pub const CERTIFICATE_HEADER: &str = "X-Certificate";

/// Header carrying base64(MD5(body)), as in RFC 1864.
pub const DIGEST_HEADER: &str = "Content-MD5";

pub const DATE_HEADER: &str = "Date";

pub const RANGE_HEADER: &str = "Range";

/// Header carrying the base64 tagged request signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Headers covered by the signature, in signing order.
pub const SIGNED_HEADERS: [&str; 4] = [CERTIFICATE_HEADER, DIGEST_HEADER, DATE_HEADER, RANGE_HEADER];

/// Build the bytes a request signature covers.
///
/// Format: `prefixed("<METHOD> <PATH>")`, then `prefixed("<Name>:<value>")`
/// for each entry of [`SIGNED_HEADERS`] that is present, in list order.
/// Prefixes are `u32` big-endian lengths. Absent headers are skipped rather
/// than encoded as empty, so the signed set is exactly the headers sent.
/// Repeated header values are joined with `,`.
///
/// # Errors
///
/// Returns `RequestError::Malformed` if a signed header value is not visible
/// ASCII or a field exceeds the wire size limit.
pub fn canonical_bytes(method: &str, path: &str, headers: &HeaderMap) -> Result<Vec<u8>, RequestError> {
    let mut out = Vec::with_capacity(128);
    push_field(&mut out, &format!("{method} {path}"))?;

    for name in SIGNED_HEADERS {
        let mut values = headers.get_all(name).iter().peekable();
        if values.peek().is_none() {
            continue;
        }
        let joined = values
            .map(|v| {
                v.to_str()
                    .map_err(|_| RequestError::Malformed(format!("non-ASCII value in {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(",");
        push_field(&mut out, &format!("{name}:{joined}"))?;
    }

    Ok(out)
}

fn push_field(out: &mut Vec<u8>, field: &str) -> Result<(), RequestError> {
    write_prefixed(out, field.as_bytes()).map_err(|e| RequestError::Malformed(e.to_string()))
}

/// `Content-MD5` value for a body: standard base64 of its MD5 digest.
#[must_use]
pub fn content_digest(body: &[u8]) -> String {
    STANDARD.encode(md5::compute(body).0)
}
