//! Chunk framing and rewind-on-reject dispatch
//!
//! Every Ogre stream is a flat run of `{id: u16, length: i32}` headers, each
//! followed by its payload. Nesting is implicit: a decoder keeps reading
//! headers while they belong to it, and hands the first foreign header back
//! to its caller by rewinding over it.

use std::io::{BufRead, Seek};

use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::{HEADER_STREAM_ID, HEADER_STREAM_ID_SWAPPED};

/// Size of a chunk header on disk: u16 id + i32 length
pub const CHUNK_HEADER_SIZE: u64 = 6;

/// A chunk header as read from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: u16,
    /// Declared size of the chunk, header included
    pub length: i32,
    /// Absolute offset of the header's first byte
    pub offset: u64,
}

impl ChunkHeader {
    /// Declared payload size, header excluded
    pub fn payload_len(&self) -> Result<u64> {
        u64::try_from(self.length)
            .ok()
            .and_then(|len| len.checked_sub(CHUNK_HEADER_SIZE))
            .ok_or_else(|| {
                OgreError::malformed(
                    self.id,
                    self.offset,
                    format!("declared length {} is shorter than its header", self.length),
                )
            })
    }
}

/// What a chunk handler did with the header it was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFlow {
    /// The handler read the chunk's payload
    Consumed,
    /// Not this decoder's chunk, hand the header back
    Rejected,
}

/// Read one chunk header
pub fn read_chunk<R: BufRead + Seek>(cursor: &mut BinaryCursor<R>) -> Result<ChunkHeader> {
    let offset = cursor.offset();
    let id = cursor.read_u16("chunk id")?;
    let length = cursor.read_i32("chunk length")?;
    Ok(ChunkHeader { id, length, offset })
}

/// Feed chunk headers to `handler` until it rejects one or the stream ends
///
/// A rejected header is unread, so the caller's own loop sees it next.
pub fn process_chunks<R, F>(cursor: &mut BinaryCursor<R>, mut handler: F) -> Result<()>
where
    R: BufRead + Seek,
    F: FnMut(&mut BinaryCursor<R>, ChunkHeader) -> Result<ChunkFlow>,
{
    while !cursor.is_eof()? {
        let chunk = read_chunk(cursor)?;
        match handler(cursor, chunk)? {
            ChunkFlow::Consumed => {}
            ChunkFlow::Rejected => {
                tracing::trace!(id = chunk.id, offset = chunk.offset, "chunk handed back");
                cursor.rewind(CHUNK_HEADER_SIZE)?;
                break;
            }
        }
    }
    Ok(())
}

/// Step over a chunk whose header was just read, using its declared length
pub fn skip_chunk<R: BufRead + Seek>(
    cursor: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<()> {
    let payload = chunk.payload_len()?;
    tracing::trace!(id = chunk.id, payload, "skipping chunk");
    cursor.skip(payload, "skipped chunk payload")
}

/// Validate the stream header and serializer version string
pub fn read_file_header<R: BufRead + Seek>(
    cursor: &mut BinaryCursor<R>,
    expected_version: &str,
) -> Result<()> {
    let offset = cursor.offset();
    let magic = cursor.read_u16("header id")?;
    match magic {
        HEADER_STREAM_ID => {}
        HEADER_STREAM_ID_SWAPPED => {
            return Err(OgreError::unsupported("endian-flip", magic, offset));
        }
        other => {
            return Err(OgreError::UnsupportedVersion {
                expected: format!("header id 0x{:04X}", HEADER_STREAM_ID),
                found: format!("header id 0x{:04X}", other),
            });
        }
    }

    let version = cursor.read_string("version string")?;
    if version != expected_version {
        return Err(OgreError::UnsupportedVersion {
            expected: expected_version.to_string(),
            found: version,
        });
    }

    tracing::debug!(version = %version, "stream header accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ChunkWriter;
    use std::io::Cursor;

    fn chunk_stream(ids: &[u16]) -> Vec<u8> {
        let mut w = ChunkWriter::new();
        for &id in ids {
            w.chunk(id, |w| {
                w.u16(id);
            });
        }
        w.into_bytes()
    }

    #[test]
    fn test_is_eof_peek_idempotent_between_chunks() {
        let data = chunk_stream(&[0x10, 0x20, 0x30]);
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        for expected in [0x10u16, 0x20, 0x30] {
            let before = c.offset();
            assert!(!c.is_eof().unwrap());
            assert!(!c.is_eof().unwrap());
            assert_eq!(c.offset(), before);
            let chunk = read_chunk(&mut c).unwrap();
            assert_eq!(chunk.id, expected);
            assert_eq!(chunk.length, 8);
            assert_eq!(c.read_u16("payload").unwrap(), expected);
        }
        assert!(c.is_eof().unwrap());
        assert!(read_chunk(&mut c).is_err());
    }

    #[test]
    fn test_process_chunks_rewinds_rejected_header() {
        let data = chunk_stream(&[0x10, 0x10, 0x20]);
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        let mut seen = Vec::new();

        process_chunks(&mut c, |c, chunk| {
            if chunk.id != 0x10 {
                return Ok(ChunkFlow::Rejected);
            }
            seen.push(c.read_u16("payload")?);
            Ok(ChunkFlow::Consumed)
        })
        .unwrap();

        assert_eq!(seen, vec![0x10, 0x10]);
        assert_eq!(c.offset(), 16);
        let next = read_chunk(&mut c).unwrap();
        assert_eq!(next.id, 0x20);
        assert_eq!(next.offset, 16);
    }

    #[test]
    fn test_process_chunks_stops_at_eof() {
        let data = chunk_stream(&[0x10]);
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        let mut calls = 0;
        process_chunks(&mut c, |c, _| {
            calls += 1;
            c.read_u16("payload")?;
            Ok(ChunkFlow::Consumed)
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert!(c.is_eof().unwrap());
    }

    #[test]
    fn test_process_chunks_on_empty_stream() {
        let mut c = BinaryCursor::new(Cursor::new(&[0u8; 0][..]));
        process_chunks(&mut c, |_, _| panic!("no chunk expected")).unwrap();
    }

    #[test]
    fn test_skip_chunk() {
        let data = chunk_stream(&[0x10, 0x20]);
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        let first = read_chunk(&mut c).unwrap();
        skip_chunk(&mut c, first).unwrap();
        assert_eq!(read_chunk(&mut c).unwrap().id, 0x20);
    }

    #[test]
    fn test_skip_chunk_rejects_short_length() {
        let chunk = ChunkHeader {
            id: 0x10,
            length: 4,
            offset: 0,
        };
        assert!(matches!(
            chunk.payload_len(),
            Err(OgreError::MalformedChunk { chunk: 0x10, .. })
        ));
    }

    #[test]
    fn test_file_header() {
        let mut w = ChunkWriter::new();
        w.u16(HEADER_STREAM_ID).string("[Serializer_v1.10]");
        let data = w.into_bytes();
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        read_file_header(&mut c, "[Serializer_v1.10]").unwrap();
        assert!(c.is_eof().unwrap());
    }

    #[test]
    fn test_file_header_wrong_version() {
        let mut w = ChunkWriter::new();
        w.u16(HEADER_STREAM_ID).string("[Serializer_v1.8]");
        let data = w.into_bytes();
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        match read_file_header(&mut c, "[Serializer_v1.10]") {
            Err(OgreError::UnsupportedVersion { expected, found }) => {
                assert_eq!(expected, "[Serializer_v1.10]");
                assert_eq!(found, "[Serializer_v1.8]");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_file_header_swapped_endian() {
        let data = HEADER_STREAM_ID_SWAPPED.to_le_bytes();
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        match read_file_header(&mut c, "[Serializer_v1.10]") {
            Err(OgreError::UnsupportedFeature { feature, .. }) => {
                assert_eq!(feature, "endian-flip")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_file_header_bad_magic() {
        let data = 0x4242u16.to_le_bytes();
        let mut c = BinaryCursor::new(Cursor::new(&data[..]));
        assert!(matches!(
            read_file_header(&mut c, "[Serializer_v1.10]"),
            Err(OgreError::UnsupportedVersion { .. })
        ));
    }
}
