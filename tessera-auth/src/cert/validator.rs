//! Turning raw certificate bytes into a trusted, typed certificate.

use chrono::{DateTime, Utc};

use crate::trust::TrustedKeys;
use crate::wire::{self, Signable};

use super::{CertError, Certificate, Rejection};

/// Validates certificates against a trusted issuer set.
///
/// Order of checks:
/// 1. Version byte (inside decoding, before any crypto)
/// 2. Signature over the exact received prefix, using the claimed issuer key
/// 3. Issuer key membership in the trusted set
/// 4. Expiry
///
/// Trust and expiry are only evaluated once the signature is known to be
/// genuine, so forged bytes never learn anything about the trust set.
#[derive(Debug, Clone, Copy)]
pub struct CertificateValidator<'a> {
    trusted: &'a TrustedKeys,
}

impl<'a> CertificateValidator<'a> {
    #[must_use]
    pub fn new(trusted: &'a TrustedKeys) -> Self {
        Self { trusted }
    }

    /// Validate signed certificate bytes at time `now`.
    ///
    /// # Errors
    ///
    /// - `CertError::Wire` for malformed bytes, an unsupported version, an
    ///   unknown mechanism, or a signature that does not verify
    /// - `CertError::InvalidCertificate` for an untrusted issuer or an expired
    ///   certificate
    #[must_use = "validation result must be checked"]
    pub fn validate<P: Signable>(
        &self,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Certificate<P>, CertError> {
        let verified =
            wire::validate_with(bytes, |cert: &Certificate<P>| cert.issuer_key().clone())?;
        let cert = verified.into_inner();

        if !self.trusted.contains(cert.issuer_key()) {
            return Err(CertError::InvalidCertificate(Rejection::UntrustedIssuer));
        }

        if cert.is_expired_at(now) {
            return Err(CertError::InvalidCertificate(Rejection::Expired {
                expires_at: cert.expires_at(),
                now,
            }));
        }

        Ok(cert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::RoleMask;
    use crate::identity::PrivateKey;
    use crate::wire::{OpaquePayload, WireError};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn issue(issuer: &PrivateKey, expires_at: DateTime<Utc>) -> Vec<u8> {
        Certificate::new(
            issuer.public_key(),
            PrivateKey::generate().public_key(),
            expires_at,
            RoleMask::from_bits(0b11),
            OpaquePayload(b"alice".to_vec()),
        )
        .sign(issuer)
        .unwrap()
    }

    #[test]
    fn test_valid_certificate_accepted() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::from_keys([issuer.public_key()]);
        let bytes = issue(&issuer, now() + Duration::minutes(15));

        let cert: Certificate<OpaquePayload> =
            CertificateValidator::new(&trusted).validate(&bytes, now()).unwrap();
        assert_eq!(cert.payload(), &OpaquePayload(b"alice".to_vec()));
        assert_eq!(cert.role_mask().bits(), 0b11);
    }

    #[test]
    fn test_untrusted_issuer_rejected_despite_valid_signature() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::from_keys([PrivateKey::generate().public_key()]);
        let bytes = issue(&issuer, now() + Duration::minutes(15));

        let result = CertificateValidator::new(&trusted).validate::<OpaquePayload>(&bytes, now());
        assert_eq!(
            result.unwrap_err(),
            CertError::InvalidCertificate(Rejection::UntrustedIssuer)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::from_keys([issuer.public_key()]);
        let expires_at = now();
        let bytes = issue(&issuer, expires_at);
        let validator = CertificateValidator::new(&trusted);

        // Exactly at expiry: still valid
        assert!(validator.validate::<OpaquePayload>(&bytes, expires_at).is_ok());

        // One microsecond past: expired
        let later = expires_at + Duration::microseconds(1);
        assert!(matches!(
            validator.validate::<OpaquePayload>(&bytes, later),
            Err(CertError::InvalidCertificate(Rejection::Expired { .. }))
        ));
    }

    #[test]
    fn test_forged_signature_checked_before_trust() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::new();
        let mut bytes = issue(&issuer, now() + Duration::minutes(15));
        // Flip a bit in the payload
        bytes[96] ^= 0x01;

        let result = CertificateValidator::new(&trusted).validate::<OpaquePayload>(&bytes, now());
        assert_eq!(result.unwrap_err(), CertError::Wire(WireError::InvalidSignature));
    }

    #[test]
    fn test_version_gate_before_crypto() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::from_keys([issuer.public_key()]);
        let mut bytes = issue(&issuer, now() + Duration::minutes(15));
        bytes[0] = 0x07;

        let result = CertificateValidator::new(&trusted).validate::<OpaquePayload>(&bytes, now());
        assert_eq!(
            result.unwrap_err(),
            CertError::Wire(WireError::UnsupportedVersion { expected: 1, actual: 7 })
        );
    }

    #[test]
    fn test_unknown_mechanism_rejected() {
        let issuer = PrivateKey::generate();
        let trusted = TrustedKeys::from_keys([issuer.public_key()]);
        let mut bytes = issue(&issuer, now() + Duration::minutes(15));
        // Issuer key tag byte
        bytes[5] = 0x42;

        let result = CertificateValidator::new(&trusted).validate::<OpaquePayload>(&bytes, now());
        assert_eq!(
            result.unwrap_err(),
            CertError::Wire(WireError::UnknownMechanism(0x42))
        );
    }
}
