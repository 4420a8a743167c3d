//! Collaborator interfaces: user catalog and session storage.
//!
//! Implementations are supplied by the host. Traits are synchronous and
//! `Send + Sync`; async hosts adapt them at their boundary.

use std::fmt;
use std::sync::Arc;

use tessera_auth::{PublicKey, Role, Signable};

use crate::error::StoreError;
use crate::session::Session;

/// Username/password pair presented at sign-up and sign-in.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A user as seen by the authority.
pub trait UserRecord {
    type Role: Role;

    fn user_id(&self) -> &str;

    /// Roles embedded in every certificate minted for this user.
    fn roles(&self) -> Vec<Self::Role>;

    fn is_enabled(&self) -> bool {
        true
    }
}

pub trait UserCatalog: Send + Sync {
    type User: UserRecord;
    /// Application data embedded in the user's certificates.
    type Payload: Signable;

    /// Fails with [`StoreError::Conflict`] if the username is taken.
    fn create_user(&self, credentials: &Credentials) -> Result<Self::User, StoreError>;

    /// `None` for an unknown user or a wrong password.
    fn find_user_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Self::User>, StoreError>;

    fn find_user_by_id(&self, user_id: &str) -> Result<Option<Self::User>, StoreError>;

    fn to_signable(&self, user: &Self::User) -> Self::Payload;
}

/// Session persistence. Saves are upserts keyed by [`Session::id`].
pub trait SessionStore: Send + Sync {
    /// Looks a session up by the exact bytes of its current certificate.
    fn find_session_by_certificate(&self, certificate: &[u8])
        -> Result<Option<Session>, StoreError>;

    /// All sessions, in any state, for a (user, client key) pair.
    fn find_sessions_for(
        &self,
        user_id: &str,
        client_key: &PublicKey,
    ) -> Result<Vec<Session>, StoreError>;

    fn save_session(&self, session: Session) -> Result<(), StoreError>;

    fn delete_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Stores a short-lived session in ephemeral storage.
    fn create_transient_session(&self, session: Session) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn find_session_by_certificate(
        &self,
        certificate: &[u8],
    ) -> Result<Option<Session>, StoreError> {
        (**self).find_session_by_certificate(certificate)
    }

    fn find_sessions_for(
        &self,
        user_id: &str,
        client_key: &PublicKey,
    ) -> Result<Vec<Session>, StoreError> {
        (**self).find_sessions_for(user_id, client_key)
    }

    fn save_session(&self, session: Session) -> Result<(), StoreError> {
        (**self).save_session(session)
    }

    fn delete_session(&self, session: &Session) -> Result<(), StoreError> {
        (**self).delete_session(session)
    }

    fn create_transient_session(&self, session: Session) -> Result<(), StoreError> {
        (**self).create_transient_session(session)
    }
}

impl<C: UserCatalog + ?Sized> UserCatalog for Arc<C> {
    type User = C::User;
    type Payload = C::Payload;

    fn create_user(&self, credentials: &Credentials) -> Result<Self::User, StoreError> {
        (**self).create_user(credentials)
    }

    fn find_user_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Self::User>, StoreError> {
        (**self).find_user_by_credentials(credentials)
    }

    fn find_user_by_id(&self, user_id: &str) -> Result<Option<Self::User>, StoreError> {
        (**self).find_user_by_id(user_id)
    }

    fn to_signable(&self, user: &Self::User) -> Self::Payload {
        (**self).to_signable(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("ada", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("ada"));
        assert!(!debug.contains("hunter2"));
    }
}
