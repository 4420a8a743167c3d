//! Mechanism-tagged binary blobs.
//!
//! Public keys and signatures travel as `tag | payload`, where the tag byte
//! selects the algorithm and the payload length is implied by the enclosing
//! length prefix.

use super::WireError;

/// Signature/key mechanism selected by the leading tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum Mechanism {
    /// Ed25519 signatures over the raw message.
    Ed25519 = 0x01,
}

impl Mechanism {
    /// Decode a tag byte.
    ///
    /// # Errors
    ///
    /// Returns `WireError::UnknownMechanism` for any unassigned tag.
    pub fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0x01 => Ok(Self::Ed25519),
            other => Err(WireError::UnknownMechanism(other)),
        }
    }

    /// The tag byte for this mechanism.
    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Raw public key length for this mechanism.
    #[must_use]
    pub fn public_key_len(self) -> usize {
        match self {
            Self::Ed25519 => 32,
        }
    }

    /// Raw signature length for this mechanism.
    #[must_use]
    pub fn signature_len(self) -> usize {
        match self {
            Self::Ed25519 => 64,
        }
    }
}

impl std::fmt::Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// A mechanism tag plus algorithm-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedBytes {
    mechanism: Mechanism,
    payload: Vec<u8>,
}

impl TaggedBytes {
    /// Wrap a raw payload with its mechanism.
    #[must_use]
    pub fn new(mechanism: Mechanism, payload: Vec<u8>) -> Self {
        Self { mechanism, payload }
    }

    /// Decode `tag | payload`.
    ///
    /// # Errors
    ///
    /// Returns `WireError::Truncated` on empty input and
    /// `WireError::UnknownMechanism` for an unassigned tag.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let (&tag, payload) = bytes.split_first().ok_or(WireError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        Ok(Self {
            mechanism: Mechanism::from_tag(tag)?,
            payload: payload.to_vec(),
        })
    }

    /// Encode as `tag | payload`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.mechanism.tag());
        out.extend_from_slice(&self.payload);
        out
    }

    #[must_use]
    pub fn mechanism(&self) -> Mechanism {
        self.mechanism
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
