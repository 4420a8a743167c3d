//! Wire format error types.

use crate::identity::KeyError;

/// Errors raised while encoding, decoding, signing or verifying wire data.
///
/// None of these are retryable: they indicate malformed or forged input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    /// The leading version byte does not match this implementation.
    #[error("unsupported version: expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u8, actual: u8 },

    /// The mechanism tag byte is not known.
    #[error("unknown mechanism tag: {0:#04x}")]
    UnknownMechanism(u8),

    /// The signature does not verify against the signed bytes.
    #[error("invalid signature")]
    InvalidSignature,

    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The input ended before a field was complete.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Bytes were left over after the signature.
    #[error("{0} trailing bytes after signature")]
    TrailingBytes(usize),

    /// A length prefix exceeds the allowed field size.
    #[error("field too large: {0} bytes")]
    TooLarge(usize),

    /// A tagged key or signature payload is malformed.
    #[error("invalid key material: {0}")]
    InvalidKey(#[from] KeyError),

    /// A timestamp field is outside the representable range.
    #[error("timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Base64 transport encoding is malformed.
    #[error("invalid base64 encoding")]
    InvalidBase64,
}
