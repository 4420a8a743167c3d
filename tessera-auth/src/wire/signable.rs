//! The `Signable` capability and the field helpers its implementations share.

use bytes::BufMut;

use super::reader::{WireReader, MAX_FIELD_LEN};
use super::WireError;

/// A value with a deterministic byte encoding that can be signed and verified.
///
/// `read` must consume exactly the bytes `write` produced, so that a signature
/// appended after the value can be located without knowing its length up front.
pub trait Signable: Sized {
    /// Append the encoding of `self` to `sink`.
    fn write(&self, sink: &mut Vec<u8>) -> Result<(), WireError>;

    /// Decode a value, advancing `reader` past exactly its encoding.
    fn read(reader: &mut WireReader<'_>) -> Result<Self, WireError>;

    /// The encoding of `self` as an owned buffer.
    fn content(&self) -> Result<Vec<u8>, WireError> {
        let mut sink = Vec::new();
        self.write(&mut sink)?;
        Ok(sink)
    }
}

/// Append a `u32` big-endian length followed by `bytes`.
///
/// # Errors
///
/// Returns `WireError::TooLarge` if `bytes` exceeds the per-field limit.
pub fn write_prefixed(sink: &mut Vec<u8>, bytes: &[u8]) -> Result<(), WireError> {
    if bytes.len() > MAX_FIELD_LEN {
        return Err(WireError::TooLarge(bytes.len()));
    }
    sink.put_u32(bytes.len() as u32);
    sink.put_slice(bytes);
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_prefixed_str(reader: &mut WireReader<'_>) -> Result<String, WireError> {
    let raw = reader.read_prefixed()?;
    String::from_utf8(raw.to_vec()).map_err(|_| WireError::InvalidUtf8)
}

/// Length-prefixed opaque bytes, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaquePayload(pub Vec<u8>);

impl Signable for OpaquePayload {
    fn write(&self, sink: &mut Vec<u8>) -> Result<(), WireError> {
        write_prefixed(sink, &self.0)
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self(reader.read_prefixed()?.to_vec()))
    }
}

impl Signable for String {
    fn write(&self, sink: &mut Vec<u8>) -> Result<(), WireError> {
        write_prefixed(sink, self.as_bytes())
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        read_prefixed_str(reader)
    }
}

impl Signable for () {
    fn write(&self, _sink: &mut Vec<u8>) -> Result<(), WireError> {
        Ok(())
    }

    fn read(_reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_encoding_layout() {
        let content = "abc".to_string().content().unwrap();
        assert_eq!(content, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_read_consumes_exactly_its_bytes() {
        let mut buf = OpaquePayload(vec![9, 8, 7]).content().unwrap();
        buf.extend_from_slice(&[0xff, 0xff]);

        let mut reader = WireReader::new(&buf);
        let payload = OpaquePayload::read(&mut reader).unwrap();
        assert_eq!(payload, OpaquePayload(vec![9, 8, 7]));
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let buf = [0, 0, 0, 2, 0xc3, 0x28];
        let mut reader = WireReader::new(&buf);
        assert_eq!(String::read(&mut reader), Err(WireError::InvalidUtf8));
    }

    #[test]
    fn test_unit_payload_is_empty() {
        assert!(().content().unwrap().is_empty());
    }
}
