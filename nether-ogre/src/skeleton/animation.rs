//! Animation, track and keyframe chunk bodies

use std::io::{BufRead, Seek};

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use crate::chunk::{CHUNK_HEADER_SIZE, ChunkFlow, ChunkHeader, process_chunks};
use crate::cursor::BinaryCursor;
use crate::error::{OgreError, Result};
use crate::skeleton_chunks::*;

use super::{Animation, AnimationKeyFrame, AnimationTrack, Bone};

/// Keyframe size when no scale follows: header + time + rotation + translation
pub(crate) const KEYFRAME_SIZE_WITHOUT_SCALE: u64 = CHUNK_HEADER_SIZE + 4 + 16 + 12;

struct KeyFrameFields {
    time: f32,
    rotation: Quat,
    translation: Vec3,
}

enum KeyFrameRecord {
    Unscaled(KeyFrameFields),
    Scaled(KeyFrameFields, Vec3),
}

impl KeyFrameRecord {
    fn into_key_frame(self) -> AnimationKeyFrame {
        let (fields, scale) = match self {
            Self::Unscaled(fields) => (fields, Vec3::ONE),
            Self::Scaled(fields, scale) => (fields, scale),
        };
        AnimationKeyFrame {
            time: fields.time,
            rotation: fields.rotation,
            translation: fields.translation,
            scale,
        }
    }
}

pub(super) fn read_animation<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    bones: &HashMap<u16, Bone>,
) -> Result<Animation> {
    let name = c.read_string("animation name")?;
    let length = c.read_f32("animation length")?;
    let mut tracks = Vec::new();

    process_chunks(c, |c, chunk| match chunk.id {
        SKELETON_ANIMATION_BASEINFO => Err(OgreError::unsupported(
            "skeleton animation base info",
            chunk.id,
            chunk.offset,
        )),
        SKELETON_ANIMATION_TRACK => {
            tracks.push(read_track(c, chunk, bones)?);
            Ok(ChunkFlow::Consumed)
        }
        _ => Ok(ChunkFlow::Rejected),
    })?;

    tracing::trace!(name = %name, length, tracks = tracks.len(), "decoded animation");
    Ok(Animation {
        name,
        length,
        tracks,
    })
}

fn read_track<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
    bones: &HashMap<u16, Bone>,
) -> Result<AnimationTrack> {
    let handle_offset = c.offset();
    let bone_handle = c.read_u16("track bone handle")?;
    // Bones precede the animations that reference them
    if !bones.contains_key(&bone_handle) {
        return Err(OgreError::malformed(
            chunk.id,
            handle_offset,
            format!("track targets undeclared bone handle {}", bone_handle),
        ));
    }

    let mut key_frames = Vec::new();
    process_chunks(c, |c, chunk| {
        if chunk.id != SKELETON_ANIMATION_TRACK_KEYFRAME {
            return Ok(ChunkFlow::Rejected);
        }
        key_frames.push(read_key_frame(c, chunk)?.into_key_frame());
        Ok(ChunkFlow::Consumed)
    })?;

    Ok(AnimationTrack {
        bone_handle,
        key_frames,
    })
}

fn read_key_frame<R: BufRead + Seek>(
    c: &mut BinaryCursor<R>,
    chunk: ChunkHeader,
) -> Result<KeyFrameRecord> {
    let fields = KeyFrameFields {
        time: c.read_f32("keyframe time")?,
        rotation: c.read_quat("keyframe rotation")?,
        translation: c.read_vec3("keyframe translation")?,
    };

    if i64::from(chunk.length) > KEYFRAME_SIZE_WITHOUT_SCALE as i64 {
        let scale = c.read_vec3("keyframe scale")?;
        Ok(KeyFrameRecord::Scaled(fields, scale))
    } else {
        Ok(KeyFrameRecord::Unscaled(fields))
    }
}
