//! In-memory user catalog and session store.
//!
//! Backs tests and small deployments. Passwords are held as given and compared
//! in constant time; hashing belongs to a real catalog.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tessera_auth::cert::MAX_ROLES;
use tessera_auth::wire::{read_prefixed_str, write_prefixed, WireReader};
use tessera_auth::{PublicKey, Role, Signable, WireError};
use uuid::Uuid;

use crate::error::StoreError;
use crate::session::Session;
use crate::store::{Credentials, SessionStore, UserCatalog, UserRecord};

/// Any role id the codec can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoleId(pub u8);

impl Role for RoleId {
    fn id(&self) -> u8 {
        self.0
    }

    fn from_id(id: u8) -> Option<Self> {
        (id < MAX_ROLES).then_some(Self(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUser {
    pub id: String,
    pub username: String,
    password: String,
    pub roles: Vec<RoleId>,
    pub enabled: bool,
}

impl UserRecord for MemoryUser {
    type Role = RoleId;

    fn user_id(&self) -> &str {
        &self.id
    }

    fn roles(&self) -> Vec<RoleId> {
        self.roles.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Certificate payload minted for a [`MemoryUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPayload {
    pub user_id: String,
    pub username: String,
}

impl Signable for UserPayload {
    fn write(&self, sink: &mut Vec<u8>) -> Result<(), WireError> {
        write_prefixed(sink, self.user_id.as_bytes())?;
        write_prefixed(sink, self.username.as_bytes())
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            user_id: read_prefixed_str(reader)?,
            username: read_prefixed_str(reader)?,
        })
    }
}

type CertificateHash = [u8; 32];

fn certificate_hash(certificate: &[u8]) -> CertificateHash {
    Sha256::digest(certificate).into()
}

#[derive(Default)]
struct Inner {
    /// username -> user
    users: DashMap<String, MemoryUser>,
    sessions: DashMap<Uuid, Session>,
    /// SHA-256 of current certificate bytes -> session id
    by_certificate: DashMap<CertificateHash, Uuid>,
    next_user_id: AtomicU64,
}

/// Thread-safe store; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a user's roles. Returns `false` if the user is unknown.
    pub fn set_roles(&self, username: &str, roles: Vec<RoleId>) -> bool {
        match self.inner.users.get_mut(username) {
            Some(mut user) => {
                user.roles = roles;
                true
            }
            None => false,
        }
    }

    /// Enable or disable an account. Returns `false` if the user is unknown.
    pub fn set_enabled(&self, username: &str, enabled: bool) -> bool {
        match self.inner.users.get_mut(username) {
            Some(mut user) => {
                user.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    pub fn sessions_for_user(&self, user_id: &str) -> Vec<Session> {
        self.inner
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Entries in the certificate index; equals [`session_count`](Self::session_count)
    /// when no writes are in flight.
    pub fn certificate_index_len(&self) -> usize {
        self.inner.by_certificate.len()
    }

    /// Index updates happen while the session entry is held, so concurrent
    /// writers to one session cannot leave a stale hash behind.
    fn upsert(&self, session: Session) {
        let id = session.id;
        let hash = certificate_hash(&session.certificate);
        match self.inner.sessions.entry(id) {
            Entry::Occupied(mut slot) => {
                let previous_hash = certificate_hash(&slot.get().certificate);
                if previous_hash != hash {
                    self.inner
                        .by_certificate
                        .remove_if(&previous_hash, |_, owner| *owner == id);
                }
                self.inner.by_certificate.insert(hash, id);
                slot.insert(session);
            }
            Entry::Vacant(slot) => {
                self.inner.by_certificate.insert(hash, id);
                slot.insert(session);
            }
        }
    }
}

impl UserCatalog for MemoryStore {
    type User = MemoryUser;
    type Payload = UserPayload;

    fn create_user(&self, credentials: &Credentials) -> Result<MemoryUser, StoreError> {
        match self.inner.users.entry(credentials.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let n = self.inner.next_user_id.fetch_add(1, Ordering::Relaxed) + 1;
                let user = MemoryUser {
                    id: format!("user-{n}"),
                    username: credentials.username.clone(),
                    password: credentials.password.clone(),
                    roles: Vec::new(),
                    enabled: true,
                };
                slot.insert(user.clone());
                tracing::debug!(user_id = %user.id, "User created");
                Ok(user)
            }
        }
    }

    fn find_user_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<MemoryUser>, StoreError> {
        let Some(user) = self.inner.users.get(&credentials.username) else {
            return Ok(None);
        };
        let matches: bool = user
            .password
            .as_bytes()
            .ct_eq(credentials.password.as_bytes())
            .into();
        Ok(matches.then(|| user.value().clone()))
    }

    fn find_user_by_id(&self, user_id: &str) -> Result<Option<MemoryUser>, StoreError> {
        Ok(self
            .inner
            .users
            .iter()
            .find(|entry| entry.id == user_id)
            .map(|entry| entry.value().clone()))
    }

    fn to_signable(&self, user: &MemoryUser) -> UserPayload {
        UserPayload {
            user_id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn find_session_by_certificate(
        &self,
        certificate: &[u8],
    ) -> Result<Option<Session>, StoreError> {
        let Some(id) = self
            .inner
            .by_certificate
            .get(&certificate_hash(certificate))
            .map(|entry| *entry.value())
        else {
            return Ok(None);
        };
        Ok(self
            .inner
            .sessions
            .get(&id)
            .filter(|session| session.certificate == certificate)
            .map(|session| session.value().clone()))
    }

    fn find_sessions_for(
        &self,
        user_id: &str,
        client_key: &PublicKey,
    ) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .inner
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id && &entry.client_key == client_key)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn save_session(&self, session: Session) -> Result<(), StoreError> {
        tracing::debug!(session_id = %session.id, "Session saved");
        self.upsert(session);
        Ok(())
    }

    fn delete_session(&self, session: &Session) -> Result<(), StoreError> {
        if let Entry::Occupied(slot) = self.inner.sessions.entry(session.id) {
            let hash = certificate_hash(&slot.get().certificate);
            self.inner
                .by_certificate
                .remove_if(&hash, |_, owner| *owner == session.id);
            slot.remove();
            tracing::debug!(session_id = %session.id, "Session deleted");
        }
        Ok(())
    }

    fn create_transient_session(&self, session: Session) -> Result<(), StoreError> {
        tracing::debug!(session_id = %session.id, "Transient session stored");
        self.upsert(session);
        Ok(())
    }
}
