//! Nether-Ogre: Ogre binary mesh and skeleton decoder for Nethercore
//!
//! Decodes the legacy chunked `.mesh` (`[MeshSerializer_v1.100]`) and
//! `.skeleton` (`[Serializer_v1.10]`) containers into plain in-memory data:
//! index lists, raw vertex buffers with their declared layouts, bone
//! hierarchies and keyframed animations. Nothing here touches a GPU, a
//! material system or an asset cache; the caller uploads and resolves.
//!
//! # Format Overview
//!
//! A file is a header id (`0x1000`) and a newline-terminated version string,
//! followed by chunks. Each chunk is a `u16` id and an `i32` length (header
//! included), then a payload whose layout depends on the id. Nested chunks
//! simply follow their parent's fixed fields; a decoder keeps reading while
//! the ids belong to it and hands the first foreign header back to its
//! caller.
//!
//! # Usage
//!
//! ```ignore
//! use nether_ogre::{load_mesh, load_skeleton};
//!
//! let mesh = load_mesh("ninja.mesh")?;
//! for sub in &mesh.sub_meshes {
//!     println!("{}: {} indices", sub.material_name, sub.indices.len());
//! }
//!
//! if let Some(name) = &mesh.skeleton_name {
//!     let skeleton = load_skeleton(name)?;
//!     println!("{} bones", skeleton.bone_count());
//! }
//! ```
//!
//! # Unsupported
//!
//! Big-endian files, 32-bit indices, submesh texture aliases, animation
//! links and animation base info are recognized and rejected with
//! [`OgreError::UnsupportedFeature`].

mod chunk;
mod cursor;
mod error;
mod loader;
mod mesh;
mod skeleton;
#[cfg(test)]
mod testing;
mod vertex;

pub use error::{OgreError, Result};
pub use loader::{load_mesh, load_skeleton, parse_mesh, parse_skeleton};
pub use mesh::{
    BoneAssignment, Bounds, Geometry, Mesh, PrimitiveType, SubMesh, decode_mesh,
    decode_mesh_buffered,
};
pub use skeleton::{
    Animation, AnimationKeyFrame, AnimationTrack, Bone, Skeleton, SkeletonBlendMode,
    decode_skeleton, decode_skeleton_buffered,
};
pub use vertex::{VertexBufferBinding, VertexElement, VertexFormat, VertexLayout, VertexUsage};

// =============================================================================
// Constants
// =============================================================================

/// Stream header id in native (little-endian) byte order
pub const HEADER_STREAM_ID: u16 = 0x1000;

/// Stream header id as it reads from a byte-swapped (big-endian) file
pub const HEADER_STREAM_ID_SWAPPED: u16 = 0x0010;

/// The only mesh serializer version we decode
pub const MESH_VERSION: &str = "[MeshSerializer_v1.100]";

/// The only skeleton serializer version we decode
pub const SKELETON_VERSION: &str = "[Serializer_v1.10]";

/// Mesh chunk ids
pub mod mesh_chunks {
    pub const M_MESH: u16 = 0x3000;
    pub const M_SUBMESH: u16 = 0x4000;
    pub const M_SUBMESH_OPERATION: u16 = 0x4010;
    pub const M_SUBMESH_BONE_ASSIGNMENT: u16 = 0x4100;
    pub const M_SUBMESH_TEXTURE_ALIAS: u16 = 0x4200;
    pub const M_GEOMETRY: u16 = 0x5000;
    pub const M_GEOMETRY_VERTEX_DECLARATION: u16 = 0x5100;
    pub const M_GEOMETRY_VERTEX_ELEMENT: u16 = 0x5110;
    pub const M_GEOMETRY_VERTEX_BUFFER: u16 = 0x5200;
    pub const M_GEOMETRY_VERTEX_BUFFER_DATA: u16 = 0x5210;
    pub const M_MESH_SKELETON_LINK: u16 = 0x6000;
    pub const M_MESH_BONE_ASSIGNMENT: u16 = 0x7000;
    pub const M_MESH_BOUNDS: u16 = 0x9000;
    pub const M_SUBMESH_NAME_TABLE: u16 = 0xA000;
    pub const M_SUBMESH_NAME_TABLE_ELEMENT: u16 = 0xA100;
    pub const M_EDGE_LISTS: u16 = 0xB000;
}

/// Skeleton chunk ids
pub mod skeleton_chunks {
    pub const SKELETON_BLENDMODE: u16 = 0x1010;
    pub const SKELETON_BONE: u16 = 0x2000;
    pub const SKELETON_BONE_PARENT: u16 = 0x3000;
    pub const SKELETON_ANIMATION: u16 = 0x4000;
    pub const SKELETON_ANIMATION_BASEINFO: u16 = 0x4010;
    pub const SKELETON_ANIMATION_TRACK: u16 = 0x4100;
    pub const SKELETON_ANIMATION_TRACK_KEYFRAME: u16 = 0x4110;
    pub const SKELETON_ANIMATION_LINK: u16 = 0x5000;
}

// =============================================================================
// Tests
// =============================================================================
