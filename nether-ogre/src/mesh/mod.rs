//! Ogre binary mesh decoder (`[MeshSerializer_v1.100]`)
//!
//! # Layout
//! ```text
//! header 0x1000, version string
//! M_MESH
//!   skeletally_animated bool
//!   M_GEOMETRY (shared vertices, optional)
//!   M_SUBMESH *
//!     material, shared flag, index count, 32-bit flag, u16 indices
//!     M_GEOMETRY (unless shared)
//!     M_SUBMESH_OPERATION ?, M_SUBMESH_BONE_ASSIGNMENT *
//!   M_MESH_SKELETON_LINK ?, M_MESH_BONE_ASSIGNMENT *, M_MESH_BOUNDS ?
//!   M_SUBMESH_NAME_TABLE ?, M_EDGE_LISTS ?
//! ```
//! Sibling order inside each level is not fixed.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Seek};

use glam::Vec3;

use crate::MESH_VERSION;
use crate::chunk::{
    ChunkFlow, ChunkHeader, process_chunks, read_chunk, read_file_header, skip_chunk,
};
use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::mesh_chunks::*;
use crate::vertex::{VertexBufferBinding, VertexElement};

mod geometry;
mod submesh;

use geometry::read_geometry;
use submesh::{read_bone_assignment, read_submesh};

/// Primitive topology of a submesh's index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

impl PrimitiveType {
    /// Map an on-disk operation type code
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => Self::PointList,
            2 => Self::LineList,
            3 => Self::LineStrip,
            4 => Self::TriangleList,
            5 => Self::TriangleStrip,
            _ => return None,
        })
    }
}

/// Influence of one bone on one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneAssignment {
    pub vertex_index: u32,
    pub bone_handle: u16,
    pub weight: f32,
}

/// Axis-aligned bounds plus bounding sphere radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
    pub radius: f32,
}

/// Vertex declaration and the buffers bound to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertex_count: u32,
    /// Every declared element, in file order
    pub elements: Vec<VertexElement>,
    /// Buffers keyed by binding index
    pub bindings: BTreeMap<u16, VertexBufferBinding>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMesh {
    /// Material name, unresolved
    pub material_name: String,
    pub uses_shared_vertices: bool,
    pub indices: Vec<u16>,
    /// Dedicated vertex data, `None` when the submesh uses the shared geometry
    pub geometry: Option<Geometry>,
    pub primitive_type: PrimitiveType,
    /// In file order, duplicates kept
    pub bone_assignments: Vec<BoneAssignment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Flag stored for the renderer, not interpreted here
    pub skeletally_animated: bool,
    pub sub_meshes: Vec<SubMesh>,
    /// Vertex data referenced by submeshes with `uses_shared_vertices`
    pub shared_geometry: Option<Geometry>,
    pub shared_bone_assignments: Vec<BoneAssignment>,
    /// Name of the companion skeleton resource, unresolved
    pub skeleton_name: Option<String>,
    pub bounds: Option<Bounds>,
}

impl Mesh {
    /// Vertex data a submesh draws from, following the shared-vertices flag
    pub fn submesh_geometry(&self, index: usize) -> Option<&Geometry> {
        let sub = self.sub_meshes.get(index)?;
        if sub.uses_shared_vertices {
            self.shared_geometry.as_ref()
        } else {
            sub.geometry.as_ref()
        }
    }

    pub fn index_count(&self) -> usize {
        self.sub_meshes.iter().map(|s| s.indices.len()).sum()
    }
}

/// Decode a mesh from any seekable byte source
///
/// The source is owned for the duration of the call and dropped on return,
/// whether decoding succeeded or not. Reads go through a `BufReader`; use
/// [`decode_mesh_buffered`] for sources that already buffer.
pub fn decode_mesh<R: Read + Seek>(reader: R) -> Result<Mesh> {
    decode_mesh_buffered(BufReader::new(reader))
}

/// Decode a mesh from a buffered, seekable byte source
pub fn decode_mesh_buffered<R: BufRead + Seek>(reader: R) -> Result<Mesh> {
    let mut cursor = BinaryCursor::new(reader);
    read_file_header(&mut cursor, MESH_VERSION)?;

    let mut mesh = None;
    while !cursor.is_eof()? {
        let chunk = read_chunk(&mut cursor)?;
        match chunk.id {
            M_MESH if mesh.is_some() => {
                return Err(OgreError::malformed(
                    chunk.id,
                    chunk.offset,
                    "stream contains more than one mesh chunk",
                ));
            }
            M_MESH => mesh = Some(read_mesh(&mut cursor)?),
            _ => {
                tracing::debug!(id = chunk.id, offset = chunk.offset, "ignoring top-level chunk");
                skip_chunk(&mut cursor, chunk)?;
            }
        }
    }

    let mesh = mesh.ok_or_else(|| {
        OgreError::malformed(M_MESH, cursor.offset(), "stream contains no mesh chunk")
    })?;

    tracing::debug!(
        sub_meshes = mesh.sub_meshes.len(),
        indices = mesh.index_count(),
        skeleton = ?mesh.skeleton_name,
        "decoded mesh"
    );
    Ok(mesh)
}

fn read_mesh<R: BufRead + Seek>(c: &mut BinaryCursor<R>) -> Result<Mesh> {
    let mut mesh = Mesh {
        skeletally_animated: c.read_bool("skeletally animated flag")?,
        ..Mesh::default()
    };

    // Offset of the first submesh that draws from the shared geometry
    let mut first_shared_user = None;

    process_chunks(c, |c, chunk| {
        match chunk.id {
            M_SUBMESH => {
                let sub = read_submesh(c, chunk)?;
                if sub.uses_shared_vertices && first_shared_user.is_none() {
                    first_shared_user = Some(chunk.offset);
                }
                mesh.sub_meshes.push(sub);
            }
            M_GEOMETRY => {
                if mesh.shared_geometry.is_some() {
                    return Err(OgreError::malformed(
                        chunk.id,
                        chunk.offset,
                        "mesh declares shared geometry twice",
                    ));
                }
                mesh.shared_geometry = Some(read_geometry(c, chunk)?);
            }
            M_MESH_SKELETON_LINK => {
                mesh.skeleton_name = Some(c.read_string("skeleton name")?);
            }
            M_MESH_BONE_ASSIGNMENT => {
                mesh.shared_bone_assignments.push(read_bone_assignment(c)?);
            }
            M_MESH_BOUNDS => {
                mesh.bounds = Some(Bounds {
                    min: c.read_vec3("bounds min")?,
                    max: c.read_vec3("bounds max")?,
                    radius: c.read_f32("bounds radius")?,
                });
            }
            M_SUBMESH_NAME_TABLE => read_submesh_name_table(c, mesh.sub_meshes.len())?,
            M_EDGE_LISTS => skip_chunk(c, chunk)?,
            _ => return Ok(ChunkFlow::Rejected),
        }
        Ok(ChunkFlow::Consumed)
    })?;

    // Shared geometry may follow the submeshes using it, so check at the end
    if let (Some(offset), None) = (first_shared_user, &mesh.shared_geometry) {
        return Err(OgreError::malformed(
            M_SUBMESH,
            offset,
            "submesh uses shared vertices but the mesh has no shared geometry",
        ));
    }

    Ok(mesh)
}

/// Validate the index → name table; the names themselves are not kept
fn read_submesh_name_table<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    sub_mesh_count: usize,
) -> Result<()> {
    let mut names = 0usize;
    process_chunks(c, |c, chunk: ChunkHeader| {
        if chunk.id != M_SUBMESH_NAME_TABLE_ELEMENT {
            return Ok(ChunkFlow::Rejected);
        }
        let index = c.read_u16("submesh index")?;
        let name = c.read_string("submesh name")?;
        if usize::from(index) >= sub_mesh_count {
            return Err(OgreError::malformed(
                chunk.id,
                chunk.offset,
                format!(
                    "name '{}' refers to submesh {} but the mesh has {}",
                    name, index, sub_mesh_count
                ),
            ));
        }
        names += 1;
        Ok(ChunkFlow::Consumed)
    })?;
    tracing::trace!(names, "submesh name table validated");
    Ok(())
}
