//! Session records.
//!
//! One session pairs a user with a client device key. Sessions are values:
//! renewal and invalidation return an updated copy that the caller persists.

use chrono::{DateTime, Utc};
use tessera_auth::{Mechanism, PublicKey};
use uuid::Uuid;

/// Where a session stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Past `expires_at`; terminal, cannot be renewed.
    Expired,
    /// Signed out but retained.
    Invalidated,
}

/// A (user, client key) pairing and the certificate currently issued for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub client_key: PublicKey,
    pub mechanism: Mechanism,
    /// Exact bytes of the current certificate; the lookup key on refresh.
    pub certificate: Vec<u8>,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
    /// Optional device or application label supplied at sign-in.
    pub client_id: Option<String>,
    /// Transient sessions renew on the short window and live in ephemeral
    /// storage.
    pub transient: bool,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        client_key: PublicKey,
        certificate: Vec<u8>,
        expires_at: DateTime<Utc>,
        client_id: Option<String>,
        transient: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            mechanism: client_key.mechanism(),
            client_key,
            certificate,
            expires_at,
            valid: true,
            client_id,
            transient,
        }
    }

    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if !self.valid {
            SessionState::Invalidated
        } else if now > self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == SessionState::Active
    }

    /// Same session identity with a fresh certificate and expiry.
    #[must_use]
    pub fn renewed(self, certificate: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        Self {
            certificate,
            expires_at,
            ..self
        }
    }

    #[must_use]
    pub fn invalidated(self) -> Self {
        Self {
            valid: false,
            ..self
        }
    }
}
