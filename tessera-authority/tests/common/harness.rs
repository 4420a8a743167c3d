//! Test harness for session lifecycle tests.
//!
//! Wires an [`Authority`] to a shared in-memory store and exposes the store so
//! tests can inspect persisted sessions directly.

use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};
use tessera_auth::cert::{Certificate, CertificateValidator};
use tessera_auth::identity::PrivateKey;
use tessera_auth::trust::TrustedKeys;
use tessera_authority::{Authority, AuthorityConfig, MemoryStore, UserPayload};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fixed instant so expiry arithmetic is exact.
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub struct TestAuthority {
    pub authority: Authority<MemoryStore, MemoryStore>,
    pub store: MemoryStore,
    pub trusted: TrustedKeys,
}

impl TestAuthority {
    pub fn new() -> Self {
        Self::with_config(&AuthorityConfig::default())
    }

    /// Authority that refuses a second concurrent session per device.
    pub fn single_session() -> Self {
        Self::with_config(&AuthorityConfig {
            single_active_session: true,
            ..AuthorityConfig::default()
        })
    }

    pub fn with_config(config: &AuthorityConfig) -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let key = Arc::new(PrivateKey::generate());
        let authority = Authority::from_config(config, store.clone(), store.clone(), key)
            .expect("test config is valid");
        let trusted = TrustedKeys::from_keys([authority.public_key()]);
        Self {
            authority,
            store,
            trusted,
        }
    }

    /// Validate certificate bytes the way a service would.
    pub fn validate(
        &self,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> anyhow::Result<Certificate<UserPayload>> {
        Ok(CertificateValidator::new(&self.trusted).validate(bytes, now)?)
    }
}
