//! Entry points over byte slices and files

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::error::Result;
use crate::mesh::{Mesh, decode_mesh_buffered};
use crate::skeleton::{Skeleton, decode_skeleton_buffered};

/// Decode a mesh held in memory
pub fn parse_mesh(data: &[u8]) -> Result<Mesh> {
    decode_mesh_buffered(Cursor::new(data))
}

/// Decode a skeleton held in memory
pub fn parse_skeleton(data: &[u8]) -> Result<Skeleton> {
    decode_skeleton_buffered(Cursor::new(data))
}

/// Open and decode a `.mesh` file
///
/// The file handle lives only for the duration of the call.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading mesh");
    decode_mesh_buffered(BufReader::new(File::open(path)?))
}

/// Open and decode a `.skeleton` file
///
/// The file handle lives only for the duration of the call.
pub fn load_skeleton(path: impl AsRef<Path>) -> Result<Skeleton> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading skeleton");
    decode_skeleton_buffered(BufReader::new(File::open(path)?))
}
