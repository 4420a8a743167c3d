//! Appending a tagged signature to a `Signable`'s bytes.

use bytes::BufMut;

use crate::identity::{PrivateKey, Signature};

use super::{Signable, WireError};

/// Sign a value and return `content | sig_len:u32 BE | tagged signature`.
///
/// # Errors
///
/// Encoding faults are surfaced as `WireError::SigningFailed`.
pub fn sign<T: Signable>(value: &T, private_key: &PrivateKey) -> Result<Vec<u8>, WireError> {
    let mut out = value
        .content()
        .map_err(|e| WireError::SigningFailed(e.to_string()))?;

    let signature = Signature::create(&out, private_key).to_tagged().encode();
    let sig_len = u32::try_from(signature.len())
        .map_err(|_| WireError::SigningFailed("signature length overflow".to_string()))?;

    out.put_u32(sig_len);
    out.put_slice(&signature);
    Ok(out)
}
