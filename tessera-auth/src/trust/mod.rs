//! Trust primitives for certificate issuers.

mod trusted_keys;

pub use trusted_keys::{TrustedKeys, TrustedKeysProvider};
