//! Pure authentication library for Tessera.
//!
//! This crate is intentionally IO-free:
//! - No filesystem operations
//! - No network calls
//! - No database interactions
//! - No logging
//!
//! It provides the pieces shared by the issuing authority, clients and
//! services:
//! - [`wire`] - tagged key/signature blobs, the [`Signable`] contract,
//!   signing and byte-exact verification
//! - [`cert`] - certificates, role masks and certificate validation
//! - [`request`] - canonical request signing and verification
//! - [`trust`] - trusted issuer key sets
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use tessera_auth::cert::{Certificate, CertificateValidator, RoleMask};
//! use tessera_auth::identity::PrivateKey;
//! use tessera_auth::trust::TrustedKeys;
//!
//! let authority = PrivateKey::generate();
//! let client = PrivateKey::generate();
//! let now = Utc::now();
//!
//! let bytes = Certificate::new(
//!     authority.public_key(),
//!     client.public_key(),
//!     now + Duration::minutes(15),
//!     RoleMask::from_ids([0, 3]).unwrap(),
//!     "user-42".to_string(),
//! )
//! .sign(&authority)
//! .unwrap();
//!
//! let trusted = TrustedKeys::from_keys([authority.public_key()]);
//! let cert: Certificate<String> = CertificateValidator::new(&trusted)
//!     .validate(&bytes, now)
//!     .unwrap();
//! assert_eq!(cert.payload(), "user-42");
//! ```

pub mod cert;
pub mod identity;
pub mod request;
pub mod trust;
pub mod wire;

pub use cert::{CertError, Certificate, CertificateValidator, Role, RoleMask};
pub use identity::{Fingerprint, KeyError, KeyPairProvider, PrivateKey, PublicKey, Signature};
pub use request::{sign_request, verify_request, RequestError};
pub use trust::{TrustedKeys, TrustedKeysProvider};
pub use wire::{Mechanism, Signable, WireError};
