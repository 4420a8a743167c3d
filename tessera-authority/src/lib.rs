//! Session authority for Tessera.
//!
//! Issues and renews session certificates on top of `tessera-auth`:
//! - [`lifecycle`] - sign-up, sign-in, refresh and sign-out
//! - [`session`] - session records and their states
//! - [`store`] - user catalog and session store collaborators
//! - [`policy`] - session creation and renewal policies
//! - [`memory`] - in-memory collaborators
//! - [`config`] - TOML configuration
//!
//! ```
//! use std::sync::Arc;
//! use chrono::Utc;
//! use tessera_auth::PrivateKey;
//! use tessera_authority::{Authority, Credentials, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let authority = Authority::new(store.clone(), store, Arc::new(PrivateKey::generate()));
//!
//! let device = PrivateKey::generate();
//! let issued = authority
//!     .sign_up(&Credentials::new("ada", "correct horse"), device.public_key(), Utc::now())
//!     .unwrap();
//! authority.sign_out(&issued.bytes).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod policy;
pub mod session;
pub mod store;

pub use config::{AuthorityConfig, ConfigError};
pub use error::{SessionError, StoreError};
pub use lifecycle::{Authority, IssuedCertificate, SignInOptions};
pub use memory::{MemoryStore, MemoryUser, RoleId, UserPayload};
pub use policy::{
    AllowAll, AlwaysEligible, EnabledAccountsOnly, RenewalPolicy, SessionCreationPolicy,
    SingleActiveSession,
};
pub use session::{Session, SessionState};
pub use store::{Credentials, SessionStore, UserCatalog, UserRecord};
