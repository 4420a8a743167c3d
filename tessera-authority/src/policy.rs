//! Pluggable session creation and renewal policies.

use chrono::{DateTime, Utc};
use tessera_auth::PublicKey;

use crate::error::StoreError;
use crate::store::{SessionStore, UserRecord};

/// Decides whether a new session may be created for a (user, client key) pair.
pub trait SessionCreationPolicy: Send + Sync {
    fn may_create(
        &self,
        user_id: &str,
        client_key: &PublicKey,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// Any number of concurrent sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl SessionCreationPolicy for AllowAll {
    fn may_create(
        &self,
        _user_id: &str,
        _client_key: &PublicKey,
        _now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Refuses a new session while an active one exists for the same pair.
///
/// Expired and invalidated sessions do not count.
#[derive(Debug, Clone)]
pub struct SingleActiveSession<S> {
    store: S,
}

impl<S: SessionStore> SingleActiveSession<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: SessionStore> SessionCreationPolicy for SingleActiveSession<S> {
    fn may_create(
        &self,
        user_id: &str,
        client_key: &PublicKey,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let sessions = self.store.find_sessions_for(user_id, client_key)?;
        Ok(!sessions.iter().any(|s| s.is_active_at(now)))
    }
}

/// Decides whether a user's session may be renewed.
pub trait RenewalPolicy<U>: Send + Sync {
    fn may_renew(&self, user: &U) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysEligible;

impl<U> RenewalPolicy<U> for AlwaysEligible {
    fn may_renew(&self, _user: &U) -> bool {
        true
    }
}

/// Vetoes renewal for disabled accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnabledAccountsOnly;

impl<U: UserRecord> RenewalPolicy<U> for EnabledAccountsOnly {
    fn may_renew(&self, user: &U) -> bool {
        user.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::session::Session;
    use chrono::Duration;
    use tessera_auth::PrivateKey;

    #[test]
    fn test_single_active_session_counts_only_active() {
        let store = MemoryStore::new();
        let policy = SingleActiveSession::new(store.clone());
        let client_key = PrivateKey::generate().public_key();
        let now = Utc::now();

        assert!(policy.may_create("u1", &client_key, now).unwrap());

        let session = Session::new(
            "u1",
            client_key.clone(),
            vec![1],
            now + Duration::minutes(15),
            None,
            false,
        );
        store.save_session(session.clone()).unwrap();
        assert!(!policy.may_create("u1", &client_key, now).unwrap());

        // Other key or other user is unaffected
        let other_key = PrivateKey::generate().public_key();
        assert!(policy.may_create("u1", &other_key, now).unwrap());
        assert!(policy.may_create("u2", &client_key, now).unwrap());

        // Expired no longer blocks
        assert!(policy
            .may_create("u1", &client_key, now + Duration::minutes(16))
            .unwrap());

        // Invalidated no longer blocks
        store.save_session(session.invalidated()).unwrap();
        assert!(policy.may_create("u1", &client_key, now).unwrap());
    }
}
