//! Cryptographic identity types.
//!
//! - [`PrivateKey`] - Signing key with automatic zeroization on drop
//! - [`PublicKey`] - Verification key, convertible to mechanism-tagged bytes
//! - [`Signature`] - Signature over a message, convertible to tagged bytes
//! - [`Fingerprint`] - `SHA256:{base64url}` digest of a public key
//! - [`KeyPairProvider`] - an issuer's long-lived signing identity
//!
//! # Example
//!
//! ```
//! use tessera_auth::identity::{Fingerprint, PrivateKey};
//!
//! let private_key = PrivateKey::generate();
//! let public_key = private_key.public_key();
//!
//! let signature = private_key.sign(b"hello");
//! assert!(public_key.verify(b"hello", &signature));
//! println!("{}", Fingerprint::from_public_key(&public_key));
//! ```

mod keys;

pub use keys::{Fingerprint, KeyError, KeyPairProvider, PrivateKey, PublicKey, Signature};
