//! Sequential byte reader and writer for the PDX container
//!
//! All multi-byte values are 4 bytes wide and little-endian, matching the
//! engine's own byte order.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

/// Read cursor over an in-memory buffer.
///
/// The offset never exceeds the buffer length; reads that would run past the
/// end fail with [`Error::TruncatedInput`] and leave the offset unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when `offset + lookahead` reaches the end of the buffer.
    #[inline]
    pub fn at_end(&self, lookahead: usize) -> bool {
        self.offset + lookahead >= self.data.len()
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(n).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(self.truncated(n)),
        }
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.offset)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    pub fn peek_char(&self) -> Result<char> {
        self.peek_u8().map(char::from)
    }

    pub fn next_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn next_char(&mut self) -> Result<char> {
        self.next_u8().map(char::from)
    }

    pub fn next_i8(&mut self) -> Result<i8> {
        Ok(self.next_u8()? as i8)
    }

    pub fn next_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn next_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn next_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    /// Read bytes up to (and consuming) the next NUL.
    pub fn next_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.offset..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(self.truncated(rest.len() + 1));
        };
        let bytes = self.take(len + 1)?;
        Ok(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }

    /// Count the run of `[` bytes at the current offset without consuming it.
    pub fn peek_depth(&self) -> u32 {
        self.data[self.offset..]
            .iter()
            .take_while(|&&b| b == b'[')
            .count() as u32
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::TruncatedInput {
            offset: self.offset,
            needed,
            len: self.data.len(),
        }
    }
}

/// Growable output buffer mirroring [`ByteCursor`].
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn put_i8(&mut self, value: i8) -> Result<()> {
        self.buf.write_i8(value)?;
        Ok(())
    }

    pub fn put_i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn put_f32(&mut self, value: f32) -> Result<()> {
        self.buf.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.write_all(bytes)?;
        Ok(())
    }

    /// Write the string bytes followed by a NUL terminator.
    pub fn put_cstring(&mut self, value: &str) -> Result<()> {
        self.put_bytes(value.as_bytes())?;
        self.put_u8(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_offset() {
        let mut bytes = vec![0xFFu8];
        bytes.extend_from_slice(&(-2i32).to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_i8().unwrap(), -1);
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.next_i32().unwrap(), -2);
        assert_eq!(cursor.next_u32().unwrap(), 7);
        assert!((cursor.next_f32().unwrap() - 1.5).abs() < f32::EPSILON);
        assert_eq!(cursor.offset(), 13);
        assert!(cursor.at_end(0));
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut cursor = ByteCursor::new(b"[[x");
        assert_eq!(cursor.peek_char().unwrap(), '[');
        assert_eq!(cursor.peek_depth(), 2);
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.next_char().unwrap(), '[');
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        let err = cursor.next_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedInput { offset: 0, needed: 4, len: 3 }
        ));
        // A failed read leaves the cursor where it was
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_at_end_lookahead() {
        let cursor = ByteCursor::new(&[0, 0, 0]);
        assert!(!cursor.at_end(0));
        assert!(!cursor.at_end(2));
        assert!(cursor.at_end(3));
    }

    #[test]
    fn test_cstring_requires_terminator() {
        let mut cursor = ByteCursor::new(b"mesh\0rest");
        assert_eq!(cursor.next_cstring().unwrap(), "mesh");
        assert_eq!(cursor.offset(), 5);
        assert!(matches!(
            cursor.next_cstring(),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_writer_mirrors_reader() {
        let mut writer = ByteWriter::new();
        writer.put_i8(-3).unwrap();
        writer.put_i32(-40).unwrap();
        writer.put_u32(9).unwrap();
        writer.put_f32(0.25).unwrap();
        writer.put_cstring("aabb").unwrap();
        let bytes = writer.into_inner();

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.next_i8().unwrap(), -3);
        assert_eq!(cursor.next_i32().unwrap(), -40);
        assert_eq!(cursor.next_u32().unwrap(), 9);
        assert_eq!(cursor.next_f32().unwrap().to_bits(), 0.25f32.to_bits());
        assert_eq!(cursor.next_cstring().unwrap(), "aabb");
        assert!(cursor.at_end(0));
    }
}
