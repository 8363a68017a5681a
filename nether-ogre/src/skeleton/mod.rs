//! Ogre binary skeleton decoder (`[Serializer_v1.10]`)
//!
//! Bones, parent links and animations arrive as a flat run of top-level
//! chunks in no guaranteed order. Everything is collected by bone handle
//! first; the hierarchy is linked once the stream is exhausted.

use std::io::{BufRead, BufReader, Read, Seek};

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use crate::SKELETON_VERSION;
use crate::chunk::{ChunkHeader, read_chunk, read_file_header, skip_chunk};
use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::skeleton_chunks::*;

mod animation;
mod hierarchy;

use animation::read_animation;
use hierarchy::ParentLinks;

/// How animations applied to this skeleton are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonBlendMode {
    #[default]
    Average,
    Cumulative,
}

impl SkeletonBlendMode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Average),
            1 => Some(Self::Cumulative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Unique key, also the bone's slot in [`Skeleton::bones`]
    pub handle: u16,
    pub name: String,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    /// Derived from parent links after decoding
    pub parent: Option<u16>,
    /// Child handles in the order their parent links were read
    pub children: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationKeyFrame {
    pub time: f32,
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for AnimationKeyFrame {
    fn default() -> Self {
        Self {
            time: 0.0,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub bone_handle: u16,
    /// In file order
    pub key_frames: Vec<AnimationKeyFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Length in seconds
    pub length: f32,
    pub tracks: Vec<AnimationTrack>,
}

impl Animation {
    pub fn track_for(&self, bone_handle: u16) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.bone_handle == bone_handle)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// Indexed by handle, `None` where no bone carries that handle
    pub bones: Vec<Option<Bone>>,
    pub animations: HashMap<String, Animation>,
    pub blend_mode: SkeletonBlendMode,
}

impl Skeleton {
    pub fn bone(&self, handle: u16) -> Option<&Bone> {
        self.bones.get(usize::from(handle))?.as_ref()
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.iter_bones().find(|b| b.name == name)
    }

    /// Present bones in handle order
    pub fn iter_bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().flatten()
    }

    pub fn bone_count(&self) -> usize {
        self.iter_bones().count()
    }

    /// Bones without a parent
    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.iter_bones().filter(|b| b.parent.is_none())
    }

    pub fn children_of(&self, handle: u16) -> impl Iterator<Item = &Bone> {
        self.bone(handle)
            .into_iter()
            .flat_map(|b| b.children.iter())
            .filter_map(|&child| self.bone(child))
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }
}

/// Bone fields that every bone record carries
struct BoneFields {
    name: String,
    handle: u16,
    position: Vec3,
    orientation: Quat,
}

/// A bone record as stored, with or without its optional scale
enum BoneRecord {
    Unscaled(BoneFields),
    Scaled(BoneFields, Vec3),
}

impl BoneRecord {
    fn into_bone(self) -> Bone {
        let (fields, scale) = match self {
            Self::Unscaled(fields) => (fields, Vec3::ONE),
            Self::Scaled(fields, scale) => (fields, scale),
        };
        Bone {
            handle: fields.handle,
            name: fields.name,
            position: fields.position,
            orientation: fields.orientation,
            scale,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Decode a skeleton from any seekable byte source
///
/// The source is owned for the duration of the call and dropped on return,
/// whether decoding succeeded or not. Reads go through a `BufReader`; use
/// [`decode_skeleton_buffered`] for sources that already buffer.
pub fn decode_skeleton<R: Read + Seek>(reader: R) -> Result<Skeleton> {
    decode_skeleton_buffered(BufReader::new(reader))
}

/// Decode a skeleton from a buffered, seekable byte source
pub fn decode_skeleton_buffered<R: BufRead + Seek>(reader: R) -> Result<Skeleton> {
    let mut cursor = BinaryCursor::new(reader);
    read_file_header(&mut cursor, SKELETON_VERSION)?;

    let mut bones: HashMap<u16, Bone> = HashMap::new();
    let mut links = ParentLinks::default();
    let mut animations = HashMap::new();
    let mut blend_mode = SkeletonBlendMode::default();

    while !cursor.is_eof()? {
        let chunk = read_chunk(&mut cursor)?;
        match chunk.id {
            SKELETON_BLENDMODE => {
                let code = cursor.read_u16("blend mode")?;
                blend_mode = SkeletonBlendMode::from_code(code).ok_or_else(|| {
                    OgreError::unsupported(
                        format!("skeleton blend mode {}", code),
                        chunk.id,
                        chunk.offset,
                    )
                })?;
            }
            SKELETON_BONE => {
                let bone = read_bone(&mut cursor, chunk)?.into_bone();
                bones.insert(bone.handle, bone);
            }
            SKELETON_BONE_PARENT => {
                let child = cursor.read_u16("child handle")?;
                let parent = cursor.read_u16("parent handle")?;
                links.record(parent, child, chunk.offset);
            }
            SKELETON_ANIMATION => {
                let animation = read_animation(&mut cursor, &bones)?;
                animations.insert(animation.name.clone(), animation);
            }
            SKELETON_ANIMATION_LINK => {
                return Err(OgreError::unsupported(
                    "skeleton animation links",
                    chunk.id,
                    chunk.offset,
                ));
            }
            _ => {
                tracing::debug!(id = chunk.id, offset = chunk.offset, "ignoring skeleton chunk");
                skip_chunk(&mut cursor, chunk)?;
            }
        }
    }

    let skeleton = Skeleton {
        bones: hierarchy::link_bones(bones, links)?,
        animations,
        blend_mode,
    };

    tracing::debug!(
        bones = skeleton.bone_count(),
        slots = skeleton.bones.len(),
        animations = skeleton.animations.len(),
        "decoded skeleton"
    );
    Ok(skeleton)
}

fn read_bone<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<BoneRecord> {
    let fields = BoneFields {
        name: c.read_string("bone name")?,
        handle: c.read_u16("bone handle")?,
        position: c.read_vec3("bone position")?,
        orientation: c.read_quat("bone orientation")?,
    };

    // Fixed prefix is everything read so far, header and terminated name included
    let prefix_len = c.offset() - chunk.offset;
    if i64::from(chunk.length) > prefix_len as i64 {
        let scale = c.read_vec3("bone scale")?;
        Ok(BoneRecord::Scaled(fields, scale))
    } else {
        Ok(BoneRecord::Unscaled(fields))
    }
}
