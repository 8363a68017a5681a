//! Geometry chunk: vertex declaration and vertex buffers

use std::io::{BufRead, Seek};

use crate::chunk::{ChunkFlow, ChunkHeader, process_chunks, read_chunk};
use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::mesh_chunks::*;
use crate::vertex::{VertexBufferBinding, VertexElement, VertexFormat, VertexLayout, VertexUsage};

use super::Geometry;

pub(super) fn read_geometry<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<Geometry> {
    let vertex_count = c.read_i32("vertex count")?;
    let vertex_count = u32::try_from(vertex_count).map_err(|_| {
        OgreError::malformed(
            chunk.id,
            chunk.offset,
            format!("negative vertex count {}", vertex_count),
        )
    })?;

    let mut geometry = Geometry {
        vertex_count,
        ..Geometry::default()
    };
    let mut declared = false;

    process_chunks(c, |c, chunk| {
        match chunk.id {
            M_GEOMETRY_VERTEX_DECLARATION => {
                geometry.elements = read_declaration(c)?;
                declared = true;
            }
            M_GEOMETRY_VERTEX_BUFFER => {
                if !declared {
                    return Err(OgreError::malformed(
                        chunk.id,
                        chunk.offset,
                        "vertex buffer precedes the vertex declaration",
                    ));
                }
                let binding = read_vertex_buffer(c, chunk, vertex_count, &geometry.elements)?;
                geometry.bindings.insert(binding.binding_index, binding);
            }
            _ => return Ok(ChunkFlow::Rejected),
        }
        Ok(ChunkFlow::Consumed)
    })?;

    Ok(geometry)
}

fn read_declaration<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
) -> Result<Vec<VertexElement>> {
    let mut elements = Vec::new();
    process_chunks(c, |c, chunk| {
        if chunk.id != M_GEOMETRY_VERTEX_ELEMENT {
            return Ok(ChunkFlow::Rejected);
        }
        elements.push(read_vertex_element(c, chunk)?);
        Ok(ChunkFlow::Consumed)
    })?;
    Ok(elements)
}

fn read_vertex_element<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<VertexElement> {
    let source = c.read_u16("element source")?;

    let format_code = c.read_u16("element type")?;
    let format = VertexFormat::from_code(format_code).ok_or_else(|| {
        OgreError::unsupported(
            format!("vertex element type {}", format_code),
            chunk.id,
            chunk.offset,
        )
    })?;

    let usage_code = c.read_u16("element semantic")?;
    let usage = VertexUsage::from_code(usage_code).ok_or_else(|| {
        OgreError::unsupported(
            format!("vertex element semantic {}", usage_code),
            chunk.id,
            chunk.offset,
        )
    })?;

    Ok(VertexElement {
        source,
        format,
        usage,
        offset: c.read_u16("element offset")?,
        usage_index: c.read_u16("element index")?,
    })
}

fn read_vertex_buffer<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
    vertex_count: u32,
    declaration: &[VertexElement],
) -> Result<VertexBufferBinding> {
    let binding_index = c.read_u16("binding index")?;
    let stride = c.read_u16("vertex size")?;

    if c.is_eof()? {
        return Err(OgreError::malformed(
            chunk.id,
            chunk.offset,
            "vertex buffer has no data chunk",
        ));
    }
    let data_chunk = read_chunk(c)?;
    if data_chunk.id != M_GEOMETRY_VERTEX_BUFFER_DATA {
        return Err(OgreError::malformed(
            data_chunk.id,
            data_chunk.offset,
            "vertex buffer has no data chunk",
        ));
    }

    let layout = VertexLayout::for_binding(declaration, binding_index);
    if layout.stride() != u32::from(stride) {
        return Err(OgreError::malformed(
            chunk.id,
            chunk.offset,
            format!(
                "binding {} declares a {}-byte vertex but its elements add up to {}",
                binding_index,
                stride,
                layout.stride()
            ),
        ));
    }

    let len = vertex_count as usize * stride as usize;
    let data = c.read_bytes(len, "vertex buffer data")?;

    tracing::trace!(binding_index, stride, bytes = len, "decoded vertex buffer");
    Ok(VertexBufferBinding {
        binding_index,
        stride,
        layout,
        data,
    })
}
