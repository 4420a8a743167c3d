//! The set of issuer keys a verifier accepts.

use std::collections::HashSet;

use crate::identity::{Fingerprint, PublicKey};

/// Issuer public keys accepted as legitimate certificate signers.
///
/// Membership is by key value, not by identity of the object holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedKeys(HashSet<PublicKey>);

impl TrustedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = PublicKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    /// Add a key. Returns `false` if it was already trusted.
    pub fn insert(&mut self, key: PublicKey) -> bool {
        self.0.insert(key)
    }

    #[must_use]
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.0.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fingerprints of the trusted keys, for logging.
    pub fn fingerprints(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.0.iter().map(Fingerprint::from_public_key)
    }
}

impl FromIterator<PublicKey> for TrustedKeys {
    fn from_iter<I: IntoIterator<Item = PublicKey>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

/// Source of the trusted issuer set.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for concurrent verification.
pub trait TrustedKeysProvider: Send + Sync {
    fn trusted_keys(&self) -> TrustedKeys;
}

impl TrustedKeysProvider for TrustedKeys {
    fn trusted_keys(&self) -> TrustedKeys {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PrivateKey;

    #[test]
    fn test_membership_by_value() {
        let key = PrivateKey::generate().public_key();
        let trusted = TrustedKeys::from_keys([key.clone()]);

        // A separately decoded copy of the same key is trusted
        let copy = PublicKey::from_bytes(&key.to_bytes()).unwrap();
        assert!(trusted.contains(&copy));
    }

    #[test]
    fn test_unknown_key_not_trusted() {
        let trusted = TrustedKeys::from_keys([PrivateKey::generate().public_key()]);
        assert!(!trusted.contains(&PrivateKey::generate().public_key()));
    }

    #[test]
    fn test_insert_deduplicates() {
        let key = PrivateKey::generate().public_key();
        let mut trusted = TrustedKeys::new();
        assert!(trusted.insert(key.clone()));
        assert!(!trusted.insert(key));
        assert_eq!(trusted.len(), 1);
    }

    #[test]
    fn test_provider_returns_same_set() {
        let trusted: TrustedKeys = [PrivateKey::generate().public_key()].into_iter().collect();
        assert_eq!(trusted.trusted_keys(), trusted);
    }
}
