//! Position-tracking reader over a borrowed byte slice.

use super::WireError;

/// Maximum size of a single length-prefixed field (1 MiB).
pub const MAX_FIELD_LEN: usize = 1024 * 1024;

/// A cursor that remembers how far it has read and can rewind to a mark.
///
/// All reads are bounds-checked; nothing here panics on short input.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    mark: usize,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, mark: 0 }
    }

    /// Current offset from the start of the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remember the current position.
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Rewind to the last mark.
    pub fn reset(&mut self) {
        self.pos = self.mark;
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if n > self.remaining() {
            return Err(WireError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a `u32` big-endian length followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Returns `WireError::TooLarge` if the prefix exceeds [`MAX_FIELD_LEN`].
    pub fn read_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_u32()? as usize;
        if len > MAX_FIELD_LEN {
            return Err(WireError::TooLarge(len));
        }
        self.read_bytes(len)
    }
}
