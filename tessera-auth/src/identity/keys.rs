//! Key and signature types with proper secret handling:
//! - Private keys are zeroized on drop (via `ed25519-dalek`)
//! - No Debug/Display implementations that leak secrets
//! - Fingerprints use constant-time comparison
//! - Public keys and signatures convert to and from mechanism-tagged bytes

use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::Signer;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::wire::{Mechanism, TaggedBytes, WireError};

/// Errors that can occur during key operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum KeyError {
    /// The provided bytes have an invalid length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The provided bytes do not represent a valid key.
    #[error("invalid key format")]
    InvalidFormat,
}

/// A private signing key.
///
/// # Security
///
/// - Zeroized on drop (`SigningKey` implements `ZeroizeOnDrop`)
/// - No `Debug` implementation to prevent accidental logging
/// - Read-only after construction, so one key can serve any number of
///   concurrent signing calls behind an `Arc`
pub struct PrivateKey(ed25519_dalek::SigningKey);

impl PrivateKey {
    /// Generate a new random private key.
    #[must_use]
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Load a private key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidLength` if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(ed25519_dalek::SigningKey::from_bytes(&bytes)))
    }

    /// The mechanism this key signs with.
    #[must_use]
    pub fn mechanism(&self) -> Mechanism {
        Mechanism::Ed25519
    }

    /// Sign a message with this private key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message))
    }

    /// Derive the public key from this private key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }
}

// Explicitly NO Debug implementation for PrivateKey

/// Source of an issuer's signing identity.
pub trait KeyPairProvider: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn private_key(&self) -> &PrivateKey;
}

impl KeyPairProvider for PrivateKey {
    fn public_key(&self) -> PublicKey {
        PrivateKey::public_key(self)
    }

    fn private_key(&self) -> &PrivateKey {
        self
    }
}

impl KeyPairProvider for Arc<PrivateKey> {
    fn public_key(&self) -> PublicKey {
        PrivateKey::public_key(self)
    }

    fn private_key(&self) -> &PrivateKey {
        self
    }
}

/// A public verification key. Compared by value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    /// Load a public key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidLength` if the slice is not exactly 32 bytes.
    /// Returns `KeyError::InvalidFormat` if the bytes don't represent a valid point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let key =
            ed25519_dalek::VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidFormat)?;
        Ok(Self(key))
    }

    /// Export the raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    #[must_use]
    pub fn mechanism(&self) -> Mechanism {
        Mechanism::Ed25519
    }

    /// Verify a signature over a message.
    ///
    /// Uses `verify_strict` to reject weak/small-order keys.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify_strict(message, &signature.0).is_ok()
    }

    /// Wrap the raw key with its mechanism tag.
    #[must_use]
    pub fn to_tagged(&self) -> TaggedBytes {
        TaggedBytes::new(self.mechanism(), self.to_bytes().to_vec())
    }

    /// Rebuild a key from its tagged form.
    ///
    /// # Errors
    ///
    /// Returns `WireError::InvalidKey` if the payload is not a valid key for
    /// the tagged mechanism.
    pub fn from_tagged(tagged: &TaggedBytes) -> Result<Self, WireError> {
        match tagged.mechanism() {
            Mechanism::Ed25519 => Ok(Self::from_bytes(tagged.payload())?),
        }
    }

    /// Standard base64 of the tagged encoding, as used in config files.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_tagged().encode())
    }

    /// Parse the output of [`PublicKey::to_base64`].
    pub fn from_base64(encoded: &str) -> Result<Self, WireError> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|_| WireError::InvalidBase64)?;
        Self::from_tagged(&TaggedBytes::decode(&raw)?)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", Fingerprint::from_public_key(self))
    }
}

/// A signature over a message.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Sign `content` with `private_key` under the key's mechanism.
    #[must_use]
    pub fn create(content: &[u8], private_key: &PrivateKey) -> Self {
        private_key.sign(content)
    }

    /// Load a signature from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidLength` if the slice is not exactly 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 64,
            actual: bytes.len(),
        })?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&bytes)))
    }

    /// Export the raw signature bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    #[must_use]
    pub fn mechanism(&self) -> Mechanism {
        Mechanism::Ed25519
    }

    #[must_use]
    pub fn to_tagged(&self) -> TaggedBytes {
        TaggedBytes::new(self.mechanism(), self.to_bytes().to_vec())
    }

    pub fn from_tagged(tagged: &TaggedBytes) -> Result<Self, WireError> {
        match tagged.mechanism() {
            Mechanism::Ed25519 => Ok(Self::from_bytes(tagged.payload())?),
        }
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.0.to_bytes();
        write!(
            f,
            "Signature({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

/// A SHA-256 fingerprint of a public key.
///
/// Format: `SHA256:{url_safe_base64_no_padding}`
///
/// Equality is constant-time. `Hash` is derived anyway: the fingerprint is
/// public and only comparisons need timing protection.
#[derive(Clone, Eq, Hash)]
#[allow(clippy::derived_hash_with_manual_eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The prefix used for fingerprint strings.
    pub const PREFIX: &'static str = "SHA256:";

    #[must_use]
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let hash = Sha256::digest(public_key.to_bytes());
        Self(format!("{}{}", Self::PREFIX, URL_SAFE_NO_PAD.encode(hash)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}
