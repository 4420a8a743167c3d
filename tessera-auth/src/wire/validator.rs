//! Byte-exact signature verification.
//!
//! A signed value is `fields | sig_len | signature`, where the signature covers
//! the field bytes exactly as the signer produced them. The field length is only
//! known once the fields have been parsed, so verification parses first, then
//! rewinds and re-reads precisely the consumed prefix. The parsed value is never
//! re-encoded: forwarded values keep the issuer's original bytes end-to-end.

use crate::identity::{PublicKey, Signature};

use super::reader::WireReader;
use super::{Signable, TaggedBytes, WireError};

/// A value whose signature has been checked, plus the exact bytes it covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    value: T,
    signed: Vec<u8>,
}

impl<T> Verified<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// The byte range the signature was verified over.
    #[must_use]
    pub fn signed_bytes(&self) -> &[u8] {
        &self.signed
    }
}

/// Verify `bytes` against a known public key.
///
/// # Errors
///
/// Returns `WireError::InvalidSignature` if the signature does not cover the
/// parsed prefix under `public_key`, or a structural error for malformed input.
pub fn validate<T: Signable>(bytes: &[u8], public_key: &PublicKey) -> Result<Verified<T>, WireError> {
    validate_with(bytes, |_: &T| public_key.clone())
}

/// Verify `bytes` against a key chosen from the parsed, not yet trusted, value.
///
/// The caller is responsible for deciding afterwards whether that key is one
/// it trusts; this function only proves the value was signed by it.
pub fn validate_with<T, F>(bytes: &[u8], select_key: F) -> Result<Verified<T>, WireError>
where
    T: Signable,
    F: FnOnce(&T) -> PublicKey,
{
    let mut reader = WireReader::new(bytes);
    reader.mark();

    let value = T::read(&mut reader)?;
    let signed_len = reader.position();

    let signature = Signature::from_tagged(&TaggedBytes::decode(reader.read_prefixed()?)?)?;
    if reader.remaining() != 0 {
        return Err(WireError::TrailingBytes(reader.remaining()));
    }

    reader.reset();
    let signed = reader.read_bytes(signed_len)?;

    let public_key = select_key(&value);
    if !public_key.verify(signed, &signature) {
        return Err(WireError::InvalidSignature);
    }

    Ok(Verified {
        value,
        signed: signed.to_vec(),
    })
}

/// Decode a signed value WITHOUT checking its signature.
///
/// Only for bytes this process already verified or produced itself (for
/// example a client reading back its own certificate). Never call this on
/// input an attacker can influence.
pub fn deserialize<T: Signable>(bytes: &[u8]) -> Result<T, WireError> {
    let mut reader = WireReader::new(bytes);
    let value = T::read(&mut reader)?;
    TaggedBytes::decode(reader.read_prefixed()?)?;
    if reader.remaining() != 0 {
        return Err(WireError::TrailingBytes(reader.remaining()));
    }
    Ok(value)
}
