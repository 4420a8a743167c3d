//! The certificate value and its versioned wire layout.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::BufMut;
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::identity::{PrivateKey, PublicKey};
use crate::wire::{self, write_prefixed, Signable, TaggedBytes, WireError, WireReader};

use super::roles::{Role, RoleMask};
use super::CertError;

/// Current wire format version.
pub const CERTIFICATE_VERSION: u8 = 1;

/// A signed, expiring binding of issuer key, client key, roles and payload.
///
/// Wire format (all multi-byte integers big-endian):
///
/// | Field          | Size | Description                               |
/// |----------------|------|-------------------------------------------|
/// | version        | 1    | `CERTIFICATE_VERSION`                     |
/// | issuer_key_len | 4    | Length of the tagged issuer key           |
/// | issuer_key     | var  | `mechanism tag | raw key`                 |
/// | client_key_len | 4    | Length of the tagged client key           |
/// | client_key     | var  | `mechanism tag | raw key`                 |
/// | expires_at     | 8    | Unix epoch milliseconds (i64)             |
/// | roles          | 8    | Role bitmask (u64)                        |
/// | payload        | var  | `P`'s own encoding                        |
///
/// The signed form appends `sig_len:u32 | tagged signature`; see [`wire::sign`].
///
/// Constructing a `Certificate` does not make it trustworthy. Certificates
/// received from elsewhere must go through
/// [`CertificateValidator`](super::CertificateValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate<P> {
    issuer_key: PublicKey,
    client_key: PublicKey,
    expires_at: DateTime<Utc>,
    roles: RoleMask,
    payload: P,
}

impl<P: Signable> Certificate<P> {
    /// Build a certificate. `expires_at` is truncated to millisecond precision
    /// so the value survives a wire round trip unchanged.
    #[must_use]
    pub fn new(
        issuer_key: PublicKey,
        client_key: PublicKey,
        expires_at: DateTime<Utc>,
        roles: RoleMask,
        payload: P,
    ) -> Self {
        Self {
            issuer_key,
            client_key,
            expires_at: expires_at.trunc_subsecs(3),
            roles,
            payload,
        }
    }

    /// Build a certificate issued by `issuer`, valid for `validity` from `now`.
    ///
    /// # Errors
    ///
    /// `CertError::Role` for an unencodable role id, and
    /// `CertError::ExpiryOutOfRange` if `now + validity` overflows.
    pub fn for_issuer<R: Role>(
        issuer: &PrivateKey,
        client_key: PublicKey,
        roles: &[R],
        payload: P,
        validity: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, CertError> {
        let expires_at = now
            .checked_add_signed(validity)
            .ok_or(CertError::ExpiryOutOfRange { now, validity })?;
        Ok(Self::new(
            issuer.public_key(),
            client_key,
            expires_at,
            RoleMask::encode(roles)?,
            payload,
        ))
    }

    /// Sign with the issuer's private key.
    ///
    /// # Errors
    ///
    /// Returns `WireError::SigningFailed` if `issuer` does not match
    /// `issuer_key`, or if the certificate cannot be encoded.
    pub fn sign(&self, issuer: &PrivateKey) -> Result<Vec<u8>, WireError> {
        if issuer.public_key() != self.issuer_key {
            return Err(WireError::SigningFailed(
                "signing key does not match issuer key".to_string(),
            ));
        }
        wire::sign(self, issuer)
    }

    /// Decode signed certificate bytes WITHOUT verifying the signature.
    ///
    /// For reading back a certificate this process already holds (for example a
    /// client inspecting its own expiry). Never use on untrusted input.
    pub fn from_trusted_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        wire::deserialize(bytes)
    }

    #[must_use]
    pub fn issuer_key(&self) -> &PublicKey {
        &self.issuer_key
    }

    #[must_use]
    pub fn client_key(&self) -> &PublicKey {
        &self.client_key
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn role_mask(&self) -> RoleMask {
        self.roles
    }

    /// Decode the role set into the application's role type.
    pub fn roles<R: Role>(&self) -> Result<std::collections::BTreeSet<R>, CertError> {
        Ok(self.roles.decode()?)
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Expiry is exclusive of the boundary: at `now == expires_at` the
    /// certificate is still valid.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl<P: Signable> Signable for Certificate<P> {
    fn write(&self, sink: &mut Vec<u8>) -> Result<(), WireError> {
        sink.put_u8(CERTIFICATE_VERSION);
        write_prefixed(sink, &self.issuer_key.to_tagged().encode())?;
        write_prefixed(sink, &self.client_key.to_tagged().encode())?;
        sink.put_i64(self.expires_at.timestamp_millis());
        sink.put_u64(self.roles.bits());
        self.payload.write(sink)
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        // Version first: fail before any key parsing or crypto work
        let version = reader.read_u8()?;
        if version != CERTIFICATE_VERSION {
            return Err(WireError::UnsupportedVersion {
                expected: CERTIFICATE_VERSION,
                actual: version,
            });
        }

        let issuer_key = PublicKey::from_tagged(&TaggedBytes::decode(reader.read_prefixed()?)?)?;
        let client_key = PublicKey::from_tagged(&TaggedBytes::decode(reader.read_prefixed()?)?)?;

        let millis = reader.read_i64()?;
        let expires_at =
            DateTime::from_timestamp_millis(millis).ok_or(WireError::InvalidTimestamp(millis))?;

        let roles = RoleMask::from_bits(reader.read_u64()?);
        let payload = P::read(reader)?;

        Ok(Self {
            issuer_key,
            client_key,
            expires_at,
            roles,
            payload,
        })
    }
}

/// Encode signed certificate bytes for an HTTP header.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode the output of [`encode_base64`].
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, WireError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| WireError::InvalidBase64)
}
