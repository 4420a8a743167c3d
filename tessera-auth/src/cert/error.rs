//! Certificate error types.

use chrono::{DateTime, Utc};

use crate::wire::WireError;

/// Why an otherwise well-signed certificate was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejection {
    /// The issuer key is not in the trusted key set.
    UntrustedIssuer,
    /// `now` is past the certificate's expiry.
    Expired {
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UntrustedIssuer => f.write_str("untrusted issuer"),
            Self::Expired { expires_at, now } => {
                write!(f, "expired at {expires_at}, now {now}")
            }
        }
    }
}

/// Errors in role encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RoleError {
    /// A role id that cannot be represented in a 64-bit mask.
    #[error("role id {0} out of range (0-63)")]
    OutOfRange(u8),

    /// A mask bit set for a role id the application does not recognise.
    #[error("invalid role code: bit {0}")]
    InvalidRoleCode(u8),
}

/// Errors that can occur while validating a certificate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CertError {
    /// Malformed bytes, unsupported version, unknown mechanism or bad signature.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Signature verified, but the certificate is not acceptable.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(Rejection),

    /// The role mask could not be encoded or decoded.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// `now + validity` is not a representable instant.
    #[error("expiry out of range: {now} + {validity}")]
    ExpiryOutOfRange {
        now: DateTime<Utc>,
        validity: chrono::Duration,
    },
}
