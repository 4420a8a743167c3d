//! Inter-service certificates.
//!
//! A service that calls another service issues a short-lived certificate
//! with its own key; the callee must list that key in its trusted issuers.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tessera_auth::{
    CertError, Certificate, Fingerprint, KeyPairProvider, PublicKey, Role, Signable,
};

use crate::config::{ConfigError, ServiceConfig};

pub struct ServiceIssuer {
    key: Arc<dyn KeyPairProvider>,
    validity: Duration,
}

impl ServiceIssuer {
    /// Issuer with the default 15 minute window.
    pub fn new(key: Arc<dyn KeyPairProvider>) -> Self {
        Self {
            key,
            validity: ServiceConfig::default().certificate_validity(),
        }
    }

    /// Issuer with the configured window; the config is validated first.
    pub fn from_config(
        config: &ServiceConfig,
        key: Arc<dyn KeyPairProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            key,
            validity: config.certificate_validity(),
        })
    }

    /// The key callee services must trust.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a certificate for `client_key` valid from `now` for the configured
    /// window.
    pub fn issue<R: Role, P: Signable>(
        &self,
        client_key: PublicKey,
        roles: &[R],
        payload: P,
        now: DateTime<Utc>,
    ) -> Result<Vec<u8>, CertError> {
        let issuer = self.key.private_key();
        let fingerprint = Fingerprint::from_public_key(&client_key);
        let certificate =
            Certificate::for_issuer(issuer, client_key, roles, payload, self.validity, now)?;
        let bytes = certificate.sign(issuer)?;
        tracing::debug!(
            fingerprint = %fingerprint,
            expires_at = %certificate.expires_at(),
            "Issued service certificate"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_auth::cert::{RoleError, RoleMask};
    use tessera_auth::{CertificateValidator, PrivateKey, TrustedKeys};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum ServiceRole {
        Reader,
        Writer,
        Bogus,
    }

    impl Role for ServiceRole {
        fn id(&self) -> u8 {
            match self {
                Self::Reader => 0,
                Self::Writer => 1,
                Self::Bogus => 64,
            }
        }

        fn from_id(id: u8) -> Option<Self> {
            match id {
                0 => Some(Self::Reader),
                1 => Some(Self::Writer),
                _ => None,
            }
        }
    }

    #[test]
    fn test_issue_uses_short_window() {
        let issuer = ServiceIssuer::new(Arc::new(PrivateKey::generate()));
        let callee_key = PrivateKey::generate().public_key();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let bytes = issuer
            .issue(callee_key.clone(), &[ServiceRole::Writer], (), now)
            .unwrap();

        let trusted = TrustedKeys::from_keys([issuer.public_key()]);
        let cert: Certificate<()> = CertificateValidator::new(&trusted)
            .validate(&bytes, now)
            .unwrap();
        assert_eq!(cert.expires_at(), now + Duration::minutes(15));
        assert_eq!(cert.client_key(), &callee_key);
        assert_eq!(cert.role_mask(), RoleMask::from_ids([1]).unwrap());
    }

    #[test]
    fn test_from_config_rejects_oversized_window() {
        let config = ServiceConfig {
            certificate_validity_secs: u64::MAX,
            ..ServiceConfig::default()
        };
        let result = ServiceIssuer::from_config(&config, Arc::new(PrivateKey::generate()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let issuer = ServiceIssuer::new(Arc::new(PrivateKey::generate()));
        let result = issuer.issue(
            PrivateKey::generate().public_key(),
            &[ServiceRole::Reader],
            (),
            DateTime::<Utc>::MAX_UTC,
        );
        assert!(matches!(result, Err(CertError::ExpiryOutOfRange { .. })));
    }

    #[test]
    fn test_out_of_range_role_rejected() {
        let issuer = ServiceIssuer::new(Arc::new(PrivateKey::generate()));
        let result = issuer.issue(
            PrivateKey::generate().public_key(),
            &[ServiceRole::Reader, ServiceRole::Bogus],
            (),
            Utc::now(),
        );
        assert_eq!(result, Err(CertError::Role(RoleError::OutOfRange(64))));
    }
}
