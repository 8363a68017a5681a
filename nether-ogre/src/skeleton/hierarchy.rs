//! Deferred bone hierarchy reconstruction

use hashbrown::HashMap;

use crate::error::{OgreError, Result};
use crate::skeleton_chunks::SKELETON_BONE_PARENT;

use super::Bone;

#[derive(Debug, Clone, Copy)]
struct Link {
    parent: u16,
    child: u16,
    /// Offset of the parent-link chunk, for diagnostics
    offset: u64,
}

/// Parent links in the order they were read
///
/// Either end of a link may name a bone that has not been read yet; nothing
/// is checked until [`link_bones`].
#[derive(Debug, Default)]
pub(super) struct ParentLinks {
    links: Vec<Link>,
}

impl ParentLinks {
    pub fn record(&mut self, parent: u16, child: u16, offset: u64) {
        self.links.push(Link {
            parent,
            child,
            offset,
        });
    }
}

/// Attach children to parents and lay bones out densely by handle
///
/// Links are applied in stream order, so the first bad link is the one
/// reported. A link naming an undeclared bone, a bone linked to itself, a
/// second parent for the same bone and a link closing a cycle are all
/// malformed. Repeating a link is harmless.
///
/// The result has `max_handle + 1` slots; handles nobody declared stay `None`.
pub(super) fn link_bones(
    mut bones: HashMap<u16, Bone>,
    links: ParentLinks,
) -> Result<Vec<Option<Bone>>> {
    for link in links.links {
        let Link {
            parent,
            child,
            offset,
        } = link;
        let malformed = |reason: String| OgreError::malformed(SKELETON_BONE_PARENT, offset, reason);

        for handle in [parent, child] {
            if !bones.contains_key(&handle) {
                return Err(malformed(format!(
                    "link {} -> {} names undeclared bone {}",
                    child, parent, handle
                )));
            }
        }
        if child == parent {
            return Err(malformed(format!("bone {} cannot be its own parent", child)));
        }

        match bones[&child].parent {
            Some(existing) if existing == parent => continue,
            Some(existing) => {
                return Err(malformed(format!(
                    "bone {} already has parent {}, cannot attach to {}",
                    child, existing, parent
                )));
            }
            None => {}
        }

        // Every bone has at most one parent and no cycle exists yet, so the
        // walk ends at a root.
        let mut ancestor = Some(parent);
        while let Some(handle) = ancestor {
            if handle == child {
                return Err(malformed(format!(
                    "link {} -> {} would make bone {} its own ancestor",
                    child, parent, child
                )));
            }
            ancestor = bones.get(&handle).and_then(|b| b.parent);
        }

        if let Some(child_bone) = bones.get_mut(&child) {
            child_bone.parent = Some(parent);
        }
        if let Some(parent_bone) = bones.get_mut(&parent) {
            parent_bone.children.push(child);
        }
    }

    let Some(max_handle) = bones.keys().copied().max() else {
        return Ok(Vec::new());
    };

    let mut dense: Vec<Option<Bone>> = vec![None; usize::from(max_handle) + 1];
    for (handle, bone) in bones {
        dense[usize::from(handle)] = Some(bone);
    }
    Ok(dense)
}
