//! Session lifecycle: sign-up, sign-in, refresh and sign-out.
//!
//! The [`Authority`] owns the issuing key and mints a certificate for every
//! session it creates or renews. Storage and user lookup are delegated to the
//! [`UserCatalog`] and [`SessionStore`] collaborators.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tessera_auth::{CertError, Certificate, Fingerprint, KeyPairProvider, PublicKey};
use uuid::Uuid;

use crate::config::{AuthorityConfig, ConfigError};
use crate::error::{SessionError, StoreError};
use crate::policy::{
    AllowAll, AlwaysEligible, RenewalPolicy, SessionCreationPolicy, SingleActiveSession,
};
use crate::session::Session;
use crate::store::{Credentials, SessionStore, UserCatalog, UserRecord};

/// A freshly minted session certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    /// Signed certificate bytes, returned to the client verbatim.
    pub bytes: Vec<u8>,
    pub expires_at: DateTime<Utc>,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOptions {
    /// Persistent ("remember me") session on the long window; otherwise a
    /// transient session on the short window.
    pub remember: bool,
    pub client_id: Option<String>,
}

impl SignInOptions {
    pub fn persistent() -> Self {
        Self {
            remember: true,
            client_id: None,
        }
    }

    pub fn transient() -> Self {
        Self {
            remember: false,
            client_id: None,
        }
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

impl Default for SignInOptions {
    fn default() -> Self {
        Self::persistent()
    }
}

/// The certificate-issuing authority.
pub struct Authority<C: UserCatalog, S: SessionStore> {
    catalog: C,
    store: S,
    key: Arc<dyn KeyPairProvider>,
    creation_policy: Box<dyn SessionCreationPolicy>,
    renewal_policy: Box<dyn RenewalPolicy<C::User>>,
    session_validity: Duration,
    transient_validity: Duration,
    retain_signed_out: bool,
}

impl<C, S> Authority<C, S>
where
    C: UserCatalog,
    C::User: 'static,
    S: SessionStore,
{
    /// Authority with default windows and permissive policies.
    pub fn new(catalog: C, store: S, key: Arc<dyn KeyPairProvider>) -> Self {
        let defaults = AuthorityConfig::default();
        Self {
            catalog,
            store,
            key,
            creation_policy: Box::new(AllowAll),
            renewal_policy: Box::new(AlwaysEligible),
            session_validity: defaults.session_validity(),
            transient_validity: defaults.transient_validity(),
            retain_signed_out: defaults.retain_signed_out_sessions,
        }
    }

    /// Authority wired from configuration, which is validated first.
    ///
    /// `single_active_session` installs [`SingleActiveSession`] over a clone of
    /// `store`.
    pub fn from_config(
        config: &AuthorityConfig,
        catalog: C,
        store: S,
        key: Arc<dyn KeyPairProvider>,
    ) -> Result<Self, ConfigError>
    where
        S: Clone + 'static,
    {
        config.validate()?;
        let mut authority = Self::new(catalog, store.clone(), key);
        authority.session_validity = config.session_validity();
        authority.transient_validity = config.transient_validity();
        authority.retain_signed_out = config.retain_signed_out_sessions;
        if config.single_active_session {
            authority.creation_policy = Box::new(SingleActiveSession::new(store));
        }
        Ok(authority)
    }

    #[must_use]
    pub fn with_creation_policy(mut self, policy: impl SessionCreationPolicy + 'static) -> Self {
        self.creation_policy = Box::new(policy);
        self
    }

    #[must_use]
    pub fn with_renewal_policy(mut self, policy: impl RenewalPolicy<C::User> + 'static) -> Self {
        self.renewal_policy = Box::new(policy);
        self
    }

    /// The key services must trust to accept this authority's certificates.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new user and open a persistent session for `client_key`.
    pub fn sign_up(
        &self,
        credentials: &Credentials,
        client_key: PublicKey,
        now: DateTime<Utc>,
    ) -> Result<IssuedCertificate, SessionError> {
        let user = self.catalog.create_user(credentials).map_err(|err| match err {
            StoreError::Conflict => {
                tracing::warn!(username = %credentials.username, "Sign-up for existing user");
                SessionError::UserAlreadyExists
            }
            other => Self::store_failure(other),
        })?;
        tracing::info!(user_id = %user.user_id(), "User registered");
        self.open_session(&user, client_key, SignInOptions::persistent(), now)
    }

    pub fn sign_in(
        &self,
        credentials: &Credentials,
        client_key: PublicKey,
        options: SignInOptions,
        now: DateTime<Utc>,
    ) -> Result<IssuedCertificate, SessionError> {
        let user = self
            .catalog
            .find_user_by_credentials(credentials)
            .map_err(Self::store_failure)?
            .ok_or_else(|| {
                tracing::warn!(username = %credentials.username, "Login failed");
                SessionError::LoginFailed
            })?;
        self.open_session(&user, client_key, options, now)
    }

    /// Renew the session identified by the exact bytes of its current
    /// certificate.
    ///
    /// The certificate is re-minted for the same client key; the window
    /// (persistent or transient) is the one the session was created with.
    pub fn refresh(
        &self,
        certificate: &[u8],
        now: DateTime<Utc>,
    ) -> Result<IssuedCertificate, SessionError> {
        let session = self
            .store
            .find_session_by_certificate(certificate)
            .map_err(Self::store_failure)?
            .filter(|session| session.valid)
            .ok_or(SessionError::NoSessionFound)?;

        if now > session.expires_at {
            tracing::debug!(
                session_id = %session.id,
                expires_at = %session.expires_at,
                "Refresh of expired session"
            );
            return Err(SessionError::ExpiredSession);
        }

        let user = self
            .catalog
            .find_user_by_id(&session.user_id)
            .map_err(Self::store_failure)?
            .ok_or(SessionError::NoSessionFound)?;

        if !self.renewal_policy.may_renew(&user) {
            tracing::warn!(user_id = %session.user_id, "Renewal denied by policy");
            return Err(SessionError::RenewalDenied);
        }

        let validity = self.window(session.transient);
        let minted = self.mint(&user, &session.client_key, validity, now)?;
        let renewed = session.renewed(minted.bytes, minted.expires_at);
        let issued = IssuedCertificate {
            bytes: renewed.certificate.clone(),
            expires_at: renewed.expires_at,
            session_id: renewed.id,
        };
        self.persist(renewed)?;

        tracing::info!(
            session_id = %issued.session_id,
            expires_at = %issued.expires_at,
            "Session renewed"
        );
        Ok(issued)
    }

    /// End the session for `certificate`. Absent sessions are not an error.
    pub fn sign_out(&self, certificate: &[u8]) -> Result<(), SessionError> {
        let Some(session) = self
            .store
            .find_session_by_certificate(certificate)
            .map_err(Self::store_failure)?
        else {
            tracing::debug!("Sign-out without a matching session");
            return Ok(());
        };

        let session_id = session.id;
        if self.retain_signed_out {
            self.store
                .save_session(session.invalidated())
                .map_err(Self::store_failure)?;
        } else {
            self.store
                .delete_session(&session)
                .map_err(Self::store_failure)?;
        }
        tracing::info!(session_id = %session_id, "Signed out");
        Ok(())
    }

    fn open_session(
        &self,
        user: &C::User,
        client_key: PublicKey,
        options: SignInOptions,
        now: DateTime<Utc>,
    ) -> Result<IssuedCertificate, SessionError> {
        let user_id = user.user_id();
        let fingerprint = Fingerprint::from_public_key(&client_key);

        let allowed = self
            .creation_policy
            .may_create(user_id, &client_key, now)
            .map_err(Self::store_failure)?;
        if !allowed {
            tracing::warn!(user_id = %user_id, fingerprint = %fingerprint, "Session already active");
            return Err(SessionError::AlreadyLoggedIn);
        }

        let transient = !options.remember;
        let minted = self.mint(user, &client_key, self.window(transient), now)?;
        let session = Session::new(
            user_id,
            client_key,
            minted.bytes,
            minted.expires_at,
            options.client_id,
            transient,
        );
        let issued = IssuedCertificate {
            bytes: session.certificate.clone(),
            expires_at: session.expires_at,
            session_id: session.id,
        };
        self.persist(session)?;

        tracing::info!(
            user_id = %user_id,
            fingerprint = %fingerprint,
            session_id = %issued.session_id,
            transient,
            "Session created"
        );
        Ok(issued)
    }

    fn mint(
        &self,
        user: &C::User,
        client_key: &PublicKey,
        validity: Duration,
        now: DateTime<Utc>,
    ) -> Result<Minted, SessionError> {
        let issuer = self.key.private_key();
        let certificate = Certificate::for_issuer(
            issuer,
            client_key.clone(),
            &user.roles(),
            self.catalog.to_signable(user),
            validity,
            now,
        )
        .map_err(Self::mint_failure)?;
        let bytes = certificate
            .sign(issuer)
            .map_err(|err| Self::mint_failure(CertError::from(err)))?;
        Ok(Minted {
            bytes,
            expires_at: certificate.expires_at(),
        })
    }

    fn persist(&self, session: Session) -> Result<(), SessionError> {
        if session.transient {
            self.store.create_transient_session(session)
        } else {
            self.store.save_session(session)
        }
        .map_err(Self::store_failure)
    }

    fn window(&self, transient: bool) -> Duration {
        if transient {
            self.transient_validity
        } else {
            self.session_validity
        }
    }

    fn store_failure(err: StoreError) -> SessionError {
        tracing::error!(error = %err, "Session store failure");
        SessionError::Store(err)
    }

    fn mint_failure(err: CertError) -> SessionError {
        tracing::error!(error = %err, "Certificate creation failed");
        SessionError::CertificateCreationFailed(err)
    }
}

struct Minted {
    bytes: Vec<u8>,
    expires_at: DateTime<Utc>,
}
