//! Byte builder for synthetic chunk streams used by the unit tests

use std::io::{self, Read, Seek, SeekFrom};

use glam::{Quat, Vec3};

/// Appends little-endian fields and length-prefixed chunks to a buffer
#[derive(Default)]
pub(crate) struct ChunkWriter {
    buf: Vec<u8>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes written so far, i.e. the offset of the next field
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(b'\n');
        self
    }

    pub fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    pub fn quat(&mut self, q: Quat) -> &mut Self {
        self.f32(q.x).f32(q.y).f32(q.z).f32(q.w)
    }

    /// Chunk whose declared length covers the header and everything `body` writes
    pub fn chunk(&mut self, id: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
        let start = self.buf.len();
        self.u16(id).i32(0);
        body(self);
        let length = (self.buf.len() - start) as i32;
        self.buf[start + 2..start + 6].copy_from_slice(&length.to_le_bytes());
        self
    }

    /// Chunk with an explicit declared length, regardless of what `body` writes
    pub fn chunk_with_length(
        &mut self,
        id: u16,
        length: i32,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.u16(id).i32(length);
        body(self);
        self
    }
}

/// Passes reads and seeks through and counts the bytes handed out
pub(crate) struct CountingReader<R> {
    inner: R,
    pub bytes_read: u64,
    pub seeks: u32,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            seeks: 0,
        }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seeks += 1;
        self.inner.seek(pos)
    }
}
