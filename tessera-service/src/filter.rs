//! Request authentication for services.
//!
//! The filter never rejects a request. It either attaches an authenticated
//! [`AuthContext`] or reports why the caller is anonymous; authorization is
//! left to the handler.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::Request;
use tessera_auth::cert::decode_base64;
use tessera_auth::request::CERTIFICATE_HEADER;
use tessera_auth::{
    verify_request, CertError, Certificate, CertificateValidator, Fingerprint, Role, Signable,
    TrustedKeysProvider, WireError,
};

use crate::config::{ConfigError, ServiceConfig, DEFAULT_MAX_BODY_BYTES};

/// Why a request was treated as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousReason {
    /// No `X-Certificate` header.
    NoCredentials,
    /// Undecodable, tampered, untrusted or expired certificate.
    InvalidCertificate,
    /// Missing or wrong request signature.
    SignatureValidationFailed,
    BodyTooLarge,
}

impl fmt::Display for AnonymousReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoCredentials => "no credentials",
            Self::InvalidCertificate => "invalid certificate",
            Self::SignatureValidationFailed => "signature validation failed",
            Self::BodyTooLarge => "body too large",
        };
        f.write_str(reason)
    }
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext<P> {
    certificate: Certificate<P>,
    fingerprint: Fingerprint,
}

impl<P: Signable> AuthContext<P> {
    pub fn certificate(&self) -> &Certificate<P> {
        &self.certificate
    }

    /// Fingerprint of the client key that signed the request.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn payload(&self) -> &P {
        self.certificate.payload()
    }

    pub fn roles<R: Role>(&self) -> Result<BTreeSet<R>, CertError> {
        self.certificate.roles()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<P> {
    Authenticated(AuthContext<P>),
    Anonymous(AnonymousReason),
}

impl<P> AuthOutcome<P> {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn context(&self) -> Option<&AuthContext<P>> {
        match self {
            Self::Authenticated(context) => Some(context),
            Self::Anonymous(_) => None,
        }
    }

    pub fn anonymous_reason(&self) -> Option<AnonymousReason> {
        match self {
            Self::Authenticated(_) => None,
            Self::Anonymous(reason) => Some(*reason),
        }
    }
}

/// Authenticates requests carrying a certificate and a request signature.
pub struct AuthFilter<P> {
    trust: Arc<dyn TrustedKeysProvider>,
    max_body_bytes: usize,
    _payload: PhantomData<fn() -> P>,
}

impl<P: Signable> AuthFilter<P> {
    pub fn new(trust: Arc<dyn TrustedKeysProvider>) -> Self {
        Self {
            trust,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            _payload: PhantomData,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let trusted = config.trusted_keys()?;
        Ok(Self::new(Arc::new(trusted)).with_max_body_bytes(config.max_body_bytes))
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Authenticate `request` as of `now`.
    ///
    /// Checks, in order: certificate present, certificate valid (signature,
    /// trusted issuer, expiry), body within limits, request signed by the
    /// certificate's client key.
    pub fn authenticate<B: AsRef<[u8]>>(
        &self,
        request: &Request<B>,
        now: DateTime<Utc>,
    ) -> AuthOutcome<P> {
        let method = request.method();
        let path = request.uri().path();

        let Some(header) = request.headers().get(CERTIFICATE_HEADER) else {
            tracing::debug!(%method, path, "Anonymous request");
            return AuthOutcome::Anonymous(AnonymousReason::NoCredentials);
        };

        let certificate = match self.validate_certificate(header.as_bytes(), now) {
            Ok(certificate) => certificate,
            Err(err) => {
                tracing::warn!(%method, path, error = %err, "Rejected certificate");
                return AuthOutcome::Anonymous(AnonymousReason::InvalidCertificate);
            }
        };
        let fingerprint = Fingerprint::from_public_key(certificate.client_key());

        let body_len = request.body().as_ref().len();
        if body_len > self.max_body_bytes {
            tracing::warn!(
                %method,
                path,
                fingerprint = %fingerprint,
                body_len,
                max = self.max_body_bytes,
                "Request body too large to authenticate"
            );
            return AuthOutcome::Anonymous(AnonymousReason::BodyTooLarge);
        }

        if let Err(err) = verify_request(request, certificate.client_key()) {
            tracing::warn!(
                %method,
                path,
                fingerprint = %fingerprint,
                error = %err,
                "Rejected request signature"
            );
            return AuthOutcome::Anonymous(AnonymousReason::SignatureValidationFailed);
        }

        tracing::info!(%method, path, fingerprint = %fingerprint, "Authenticated request");
        AuthOutcome::Authenticated(AuthContext {
            certificate,
            fingerprint,
        })
    }

    fn validate_certificate(
        &self,
        header: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Certificate<P>, CertError> {
        let encoded = std::str::from_utf8(header).map_err(|_| WireError::InvalidBase64)?;
        let bytes = decode_base64(encoded.trim())?;
        let trusted = self.trust.trusted_keys();
        CertificateValidator::new(&trusted).validate(&bytes, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use http::HeaderValue;
    use tessera_auth::cert::{encode_base64, RoleMask};
    use tessera_auth::{sign_request, PrivateKey, TrustedKeys};

    struct Fixture {
        issuer: PrivateKey,
        client: PrivateKey,
        filter: AuthFilter<String>,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new() -> Self {
            let issuer = PrivateKey::generate();
            let trusted = TrustedKeys::from_keys([issuer.public_key()]);
            Self {
                issuer,
                client: PrivateKey::generate(),
                filter: AuthFilter::new(Arc::new(trusted)),
                now: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            }
        }

        fn certificate(&self, validity: Duration) -> String {
            let bytes = Certificate::new(
                self.issuer.public_key(),
                self.client.public_key(),
                self.now + validity,
                RoleMask::from_ids([2]).unwrap(),
                "user-7".to_string(),
            )
            .sign(&self.issuer)
            .unwrap();
            encode_base64(&bytes)
        }

        fn request(&self, certificate: &str, body: &'static [u8]) -> Request<&'static [u8]> {
            let mut request = Request::builder()
                .method("PUT")
                .uri("/v1/items/9")
                .header(CERTIFICATE_HEADER, certificate)
                .body(body)
                .unwrap();
            sign_request(&mut request, &self.client).unwrap();
            request
        }
    }

    #[test]
    fn test_authenticated() {
        let fx = Fixture::new();
        let request = fx.request(&fx.certificate(Duration::minutes(15)), b"{}");

        let outcome = fx.filter.authenticate(&request, fx.now);
        let context = outcome.context().unwrap();
        assert_eq!(context.payload(), "user-7");
        assert_eq!(
            context.fingerprint(),
            &Fingerprint::from_public_key(&fx.client.public_key())
        );
        assert_eq!(context.certificate().role_mask().ids().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_no_certificate_is_anonymous() {
        let fx = Fixture::new();
        let request = Request::builder().uri("/").body(&b""[..]).unwrap();
        assert_eq!(
            fx.filter.authenticate(&request, fx.now),
            AuthOutcome::Anonymous(AnonymousReason::NoCredentials)
        );
    }

    #[test]
    fn test_garbage_certificate_is_anonymous() {
        let fx = Fixture::new();
        let request = fx.request("!!not base64!!", b"");
        assert_eq!(
            fx.filter.authenticate(&request, fx.now).anonymous_reason(),
            Some(AnonymousReason::InvalidCertificate)
        );
    }

    #[test]
    fn test_expired_certificate_is_anonymous() {
        let fx = Fixture::new();
        let request = fx.request(&fx.certificate(Duration::minutes(15)), b"");
        let later = fx.now + Duration::minutes(15) + Duration::milliseconds(1);
        assert_eq!(
            fx.filter.authenticate(&request, later).anonymous_reason(),
            Some(AnonymousReason::InvalidCertificate)
        );
    }

    #[test]
    fn test_signature_by_other_key_is_anonymous() {
        let fx = Fixture::new();
        let mut request = fx.request(&fx.certificate(Duration::minutes(15)), b"x");
        sign_request(&mut request, &PrivateKey::generate()).unwrap();
        assert_eq!(
            fx.filter.authenticate(&request, fx.now).anonymous_reason(),
            Some(AnonymousReason::SignatureValidationFailed)
        );
    }

    #[test]
    fn test_replaced_certificate_header_breaks_signature() {
        let fx = Fixture::new();
        let mut request = fx.request(&fx.certificate(Duration::minutes(15)), b"");
        // Still a valid certificate for the same client, but not the signed one
        let other = fx.certificate(Duration::minutes(10));
        request
            .headers_mut()
            .insert(CERTIFICATE_HEADER, HeaderValue::from_str(&other).unwrap());
        assert_eq!(
            fx.filter.authenticate(&request, fx.now).anonymous_reason(),
            Some(AnonymousReason::SignatureValidationFailed)
        );
    }

    #[test]
    fn test_oversized_body_is_anonymous() {
        let fx = Fixture::new();
        let filter = AuthFilter::<String>::new(Arc::new(TrustedKeys::from_keys([
            fx.issuer.public_key(),
        ])))
        .with_max_body_bytes(4);
        let request = fx.request(&fx.certificate(Duration::minutes(15)), b"12345");
        assert_eq!(
            filter.authenticate(&request, fx.now).anonymous_reason(),
            Some(AnonymousReason::BodyTooLarge)
        );
    }
}
