//! Submesh chunk body

use std::io::{BufRead, Seek};

use byteorder::{ByteOrder, LittleEndian};

use crate::chunk::{ChunkFlow, ChunkHeader, process_chunks, read_chunk};
use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::mesh_chunks::*;

use super::geometry::read_geometry;
use super::{BoneAssignment, PrimitiveType, SubMesh};

pub(super) fn read_submesh<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<SubMesh> {
    let material_name = c.read_string("material name")?;
    let uses_shared_vertices = c.read_bool("shared vertices flag")?;

    let index_count = c.read_i32("index count")?;
    let index_count = usize::try_from(index_count).map_err(|_| {
        OgreError::malformed(
            chunk.id,
            chunk.offset,
            format!("negative index count {}", index_count),
        )
    })?;

    let flag_offset = c.offset();
    if c.read_bool("32-bit index flag")? {
        return Err(OgreError::unsupported("32-bit indices", chunk.id, flag_offset));
    }

    let byte_len = index_count.checked_mul(2).ok_or_else(|| {
        OgreError::malformed(chunk.id, chunk.offset, "index count overflows")
    })?;
    let raw = c.read_bytes(byte_len, "index buffer")?;
    let mut indices = vec![0u16; index_count];
    LittleEndian::read_u16_into(&raw, &mut indices);

    let geometry = if uses_shared_vertices {
        None
    } else {
        if c.is_eof()? {
            return Err(OgreError::malformed(
                chunk.id,
                c.offset(),
                "submesh without shared vertices has no geometry chunk",
            ));
        }
        let next = read_chunk(c)?;
        if next.id != M_GEOMETRY {
            return Err(OgreError::malformed(
                next.id,
                next.offset,
                format!(
                    "expected geometry chunk 0x{:04X} after submesh indices",
                    M_GEOMETRY
                ),
            ));
        }
        Some(read_geometry(c, next)?)
    };

    let mut sub = SubMesh {
        material_name,
        uses_shared_vertices,
        indices,
        geometry,
        ..SubMesh::default()
    };

    process_chunks(c, |c, chunk| {
        match chunk.id {
            M_SUBMESH_OPERATION => {
                let code_offset = c.offset();
                let code = c.read_u16("operation type")?;
                sub.primitive_type = PrimitiveType::from_code(code).ok_or_else(|| {
                    OgreError::unsupported(
                        format!("primitive type {}", code),
                        chunk.id,
                        code_offset,
                    )
                })?;
            }
            M_SUBMESH_BONE_ASSIGNMENT => sub.bone_assignments.push(read_bone_assignment(c)?),
            M_SUBMESH_TEXTURE_ALIAS => {
                return Err(OgreError::unsupported(
                    "submesh texture aliases",
                    chunk.id,
                    chunk.offset,
                ));
            }
            _ => return Ok(ChunkFlow::Rejected),
        }
        Ok(ChunkFlow::Consumed)
    })?;

    tracing::trace!(
        material = %sub.material_name,
        indices = sub.indices.len(),
        shared = sub.uses_shared_vertices,
        "decoded submesh"
    );
    Ok(sub)
}

pub(super) fn read_bone_assignment<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
) -> Result<BoneAssignment> {
    Ok(BoneAssignment {
        vertex_index: c.read_u32("assignment vertex index")?,
        bone_handle: c.read_u16("assignment bone handle")?,
        weight: c.read_f32("assignment weight")?,
    })
}
