// Little-endian cursor over an MTEF byte slice.
//
// All multi-byte reads are little-endian. Reads past end-of-input fail with
// `Error::TruncatedStream`; the record decoder's body loop is the only place
// such a failure means "done" rather than "corrupt".

use crate::error::{Error, Result};

/// Bounds-checked byte cursor.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor offset from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before end-of-input.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let val = *self
            .data
            .get(self.pos)
            .ok_or(Error::TruncatedStream(self.pos))?;
        self.pos += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.take(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a zero-terminated byte string and decode it as UTF-8 (lossy).
    ///
    /// The terminator is consumed but not included. A missing terminator is
    /// a truncation error.
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let nul = memchr::memchr(0, rest).ok_or(Error::TruncatedStream(self.data.len()))?;
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Advance the cursor by `n` bytes.
    ///
    /// Skipping to exactly end-of-input is fine; skipping past it is a
    /// truncation error and leaves the cursor at end-of-input.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            self.pos = self.data.len();
            return Err(Error::TruncatedStream(self.data.len()));
        }
        self.pos += n;
        Ok(())
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::TruncatedStream(self.pos));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_reads_are_little_endian() {
        let data = [0x01, 0x34, 0x12, 0xFF, 0xFF, 0x78, 0x56, 0x34, 0x12];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert_eq!(r.read_u32().unwrap(), 0x12345678);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_read_past_end_is_truncation() {
        let mut r = ByteReader::new(&[0xAB]);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert!(matches!(r.read_u8(), Err(Error::TruncatedStream(1))));
        // Position is stable after a failed read.
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn test_u16_straddling_end_fails_without_advancing() {
        let mut r = ByteReader::new(&[0x01]);
        assert!(r.read_u16().is_err());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_cstr() {
        let data = b"MathType\0rest";
        let mut r = ByteReader::new(data);
        assert_eq!(r.read_cstr().unwrap(), "MathType");
        assert_eq!(r.position(), 9);
    }

    #[test]
    fn test_cstr_empty() {
        let mut r = ByteReader::new(&[0, 7]);
        assert_eq!(r.read_cstr().unwrap(), "");
        assert_eq!(r.read_u8().unwrap(), 7);
    }

    #[test]
    fn test_cstr_unterminated() {
        let mut r = ByteReader::new(b"abc");
        assert!(r.read_cstr().is_err());
    }

    #[test]
    fn test_skip() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        r.skip(2).unwrap();
        assert_eq!(r.read_u8().unwrap(), 3);
        assert!(r.skip(0).is_ok());
        assert!(r.skip(1).is_err());
    }
}
