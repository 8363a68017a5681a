//! Little-endian binary cursor over a buffered, seekable byte source

use std::io::{self, BufRead, Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Quat, Vec3};

use crate::error::{OgreError, Result};

/// Forward-only reader with absolute offset tracking
///
/// All multi-byte values are little-endian. The only backwards movement is
/// [`BinaryCursor::rewind`], used by the chunk stream to hand a rejected
/// header back to the enclosing decoder. End-of-stream checks look at the
/// read buffer and never move the position, so a `BufReader` keeps its
/// buffer across chunk boundaries.
pub struct BinaryCursor<R> {
    inner: R,
    offset: u64,
}

impl<R: BufRead + Seek> BinaryCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Absolute byte offset of the next read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true when no further byte can be read
    ///
    /// Only fills the read buffer, so calling this any number of times does
    /// not change what the next read returns.
    pub fn is_eof(&mut self) -> Result<bool> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Move the read position back by `count` bytes
    ///
    /// Stays inside the read buffer when the bytes are still in it.
    pub fn rewind(&mut self, count: u64) -> Result<()> {
        debug_assert!(count <= self.offset);
        self.inner.seek_relative(-(count as i64))?;
        self.offset -= count;
        Ok(())
    }

    /// Step over `count` bytes without interpreting them
    pub fn skip(&mut self, count: u64, field: &'static str) -> Result<()> {
        let copied = io::copy(&mut self.inner.by_ref().take(count), &mut io::sink())?;
        self.offset += copied;
        if copied < count {
            return Err(OgreError::UnexpectedEof {
                field,
                offset: self.offset,
            });
        }
        Ok(())
    }

    /// Run a fixed-size read, advancing the offset only on success
    fn read_fixed<T>(
        &mut self,
        field: &'static str,
        size: u64,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<T> {
        match read(&mut self.inner) {
            Ok(value) => {
                self.offset += size;
                Ok(value)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(OgreError::UnexpectedEof {
                field,
                offset: self.offset,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.read_fixed(field, 1, |r| r.read_u8())
    }

    /// Single-byte boolean, any non-zero value is true
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool> {
        Ok(self.read_u8(field)? != 0)
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        self.read_fixed(field, 2, |r| r.read_u16::<LittleEndian>())
    }

    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        self.read_fixed(field, 4, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.read_fixed(field, 4, |r| r.read_u32::<LittleEndian>())
    }

    pub fn read_f32(&mut self, field: &'static str) -> Result<f32> {
        self.read_fixed(field, 4, |r| r.read_f32::<LittleEndian>())
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.offset += read as u64;
        if read < len {
            return Err(OgreError::UnexpectedEof {
                field,
                offset: self.offset,
            });
        }
        Ok(buf)
    }

    /// Three floats in x, y, z order
    pub fn read_vec3(&mut self, field: &'static str) -> Result<Vec3> {
        let x = self.read_f32(field)?;
        let y = self.read_f32(field)?;
        let z = self.read_f32(field)?;
        Ok(Vec3::new(x, y, z))
    }

    /// Four floats in x, y, z, w order
    pub fn read_quat(&mut self, field: &'static str) -> Result<Quat> {
        let x = self.read_f32(field)?;
        let y = self.read_f32(field)?;
        let z = self.read_f32(field)?;
        let w = self.read_f32(field)?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    /// Newline-terminated Latin-1 string, terminator dropped
    pub fn read_string(&mut self, field: &'static str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.read_u8(field)? {
                b'\n' => return Ok(text),
                b => text.push(char::from(b)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingReader;
    use std::io::{BufReader, Cursor};

    fn cursor(data: &[u8]) -> BinaryCursor<Cursor<&[u8]>> {
        BinaryCursor::new(Cursor::new(data))
    }

    #[test]
    fn test_read_primitives() {
        let mut data = Vec::new();
        data.push(1u8);
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());

        let mut c = cursor(&data);
        assert!(c.read_bool("flag").unwrap());
        assert_eq!(c.read_u16("short").unwrap(), 0x1234);
        assert_eq!(c.read_i32("int").unwrap(), -7);
        assert_eq!(c.read_f32("float").unwrap(), 1.5);
        assert_eq!(c.offset(), 11);
        assert!(c.is_eof().unwrap());
    }

    #[test]
    fn test_read_string_latin1() {
        let mut c = cursor(b"caf\xe9\nrest");
        assert_eq!(c.read_string("name").unwrap(), "caf\u{e9}");
        assert_eq!(c.offset(), 5);
        assert_eq!(c.read_u8("next").unwrap(), b'r');
    }

    #[test]
    fn test_read_string_empty() {
        let mut c = cursor(b"\n");
        assert_eq!(c.read_string("name").unwrap(), "");
        assert!(c.is_eof().unwrap());
    }

    #[test]
    fn test_unterminated_string_is_eof_error() {
        let mut c = cursor(b"abc");
        assert!(matches!(
            c.read_string("material name"),
            Err(OgreError::UnexpectedEof {
                field: "material name",
                offset: 3
            })
        ));
    }

    #[test]
    fn test_is_eof_does_not_consume() {
        let mut c = cursor(&[0xAB, 0xCD]);
        for _ in 0..3 {
            assert!(!c.is_eof().unwrap());
        }
        assert_eq!(c.offset(), 0);
        assert_eq!(c.read_u16("value").unwrap(), 0xCDAB);
        assert!(c.is_eof().unwrap());
        assert!(c.is_eof().unwrap());
    }

    #[test]
    fn test_short_read_reports_offset() {
        let mut c = cursor(&[1, 2, 3]);
        c.read_u8("first").unwrap();
        assert!(matches!(
            c.read_i32("count"),
            Err(OgreError::UnexpectedEof {
                field: "count",
                offset: 1
            })
        ));
    }

    #[test]
    fn test_read_bytes_and_skip() {
        let mut c = cursor(&[1, 2, 3, 4, 5]);
        assert_eq!(c.read_bytes(2, "block").unwrap(), vec![1, 2]);
        c.skip(2, "padding").unwrap();
        assert_eq!(c.read_u8("tail").unwrap(), 5);
        assert!(c.skip(1, "padding").is_err());
        assert!(c.read_bytes(1, "block").is_err());
    }

    #[test]
    fn test_rewind() {
        let mut c = cursor(&[1, 0, 2, 0]);
        assert_eq!(c.read_u16("a").unwrap(), 1);
        c.rewind(2).unwrap();
        assert_eq!(c.offset(), 0);
        assert_eq!(c.read_u16("a").unwrap(), 1);
        assert_eq!(c.read_u16("b").unwrap(), 2);
    }

    #[test]
    fn test_read_quat_order() {
        let mut data = Vec::new();
        for v in [0.1f32, 0.2, 0.3, 0.9] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let q = cursor(&data).read_quat("orientation").unwrap();
        assert_eq!(q, Quat::from_xyzw(0.1, 0.2, 0.3, 0.9));
    }

    #[test]
    fn test_end_checks_and_short_rewinds_keep_the_buffer() {
        let data: Vec<u8> = (0..64).collect();
        let mut source = CountingReader::new(Cursor::new(&data[..]));
        let mut c = BinaryCursor::new(BufReader::with_capacity(16, &mut source));

        while !c.is_eof().unwrap() {
            assert!(!c.is_eof().unwrap());
            c.read_u16("pair").unwrap();
            c.rewind(1).unwrap();
            c.read_u8("second").unwrap();
        }
        assert_eq!(c.offset(), 64);
        drop(c);

        assert_eq!(source.seeks, 0);
        assert_eq!(source.bytes_read, 64);
    }
}
