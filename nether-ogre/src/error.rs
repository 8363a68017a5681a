//! Error types for Ogre mesh and skeleton decoding

use std::io;

/// Errors that can occur while decoding an Ogre mesh or skeleton
///
/// Every error is fatal to the decode call that produced it. Where the
/// information exists, errors carry the chunk id and the absolute byte offset
/// at which decoding stopped.
#[derive(Debug, thiserror::Error)]
pub enum OgreError {
    /// Header magic or serializer version string is not the one we decode
    #[error("unsupported version: expected {expected}, found {found}")]
    UnsupportedVersion { expected: String, found: String },

    /// The stream uses a part of the format that is recognized but not implemented
    #[error("unsupported feature '{feature}' (chunk 0x{chunk:04X} at offset {offset})")]
    UnsupportedFeature {
        feature: String,
        chunk: u16,
        offset: u64,
    },

    /// Structural problem inside a chunk
    #[error("malformed chunk 0x{chunk:04X} at offset {offset}: {reason}")]
    MalformedChunk {
        chunk: u16,
        offset: u64,
        reason: String,
    },

    /// Stream ended in the middle of a field
    #[error("unexpected end of stream reading {field} at offset {offset}")]
    UnexpectedEof { field: &'static str, offset: u64 },

    /// I/O failure of the underlying byte source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl OgreError {
    pub(crate) fn unsupported(feature: impl Into<String>, chunk: u16, offset: u64) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            chunk,
            offset,
        }
    }

    pub(crate) fn malformed(chunk: u16, offset: u64, reason: impl Into<String>) -> Self {
        Self::MalformedChunk {
            chunk,
            offset,
            reason: reason.into(),
        }
    }

    /// Chunk id the error refers to, if any
    pub fn chunk(&self) -> Option<u16> {
        match self {
            Self::UnsupportedFeature { chunk, .. } | Self::MalformedChunk { chunk, .. } => {
                Some(*chunk)
            }
            _ => None,
        }
    }

    /// Byte offset the error refers to, if any
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::UnsupportedFeature { offset, .. }
            | Self::MalformedChunk { offset, .. }
            | Self::UnexpectedEof { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Result alias used throughout the decoder
pub type Result<T> = std::result::Result<T, OgreError>;
