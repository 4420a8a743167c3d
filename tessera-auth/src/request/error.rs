//! Request signing error types.

/// Errors that can occur while signing or verifying a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    /// The request carries no signature header.
    #[error("missing request signature")]
    MissingSignature,

    /// The signature or body digest does not match the received request.
    #[error("signature validation failed")]
    SignatureValidationFailed,

    /// A signed header or the signature itself could not be encoded/decoded.
    #[error("malformed request: {0}")]
    Malformed(String),
}
