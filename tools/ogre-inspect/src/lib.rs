//! ogre-inspect library
//!
//! Decodes Ogre `.mesh` / `.skeleton` files with `nether-ogre`, follows a
//! mesh's skeleton link through [`SkeletonResolver`] and summarizes both.

pub mod config;
pub mod report;
pub mod resolver;

use anyhow::{Context, Result};
use nether_ogre::{Mesh, Skeleton};
use std::path::Path;

pub use config::{InspectConfig, OutputFormat};
pub use report::{MeshReport, SkeletonReport, render};
pub use resolver::SkeletonResolver;

/// Options for a mesh inspection
#[derive(Debug, Clone, Default)]
pub struct MeshOptions {
    pub resolver: SkeletonResolver,
    /// Follow the skeleton link at all
    pub resolve_skeleton: bool,
}

impl MeshOptions {
    pub fn from_config(config: &InspectConfig) -> Self {
        Self {
            resolver: SkeletonResolver::new(config.resolver.search_paths.clone()),
            resolve_skeleton: config.resolver.resolve_skeletons,
        }
    }
}

/// Decode a mesh and, if asked, the skeleton it links to
///
/// A skeleton that cannot be found or decoded becomes a report warning;
/// only failures of the mesh itself are errors.
pub fn inspect_mesh(path: &Path, options: &MeshOptions) -> Result<MeshReport> {
    let mesh = nether_ogre::load_mesh(path)
        .with_context(|| format!("Failed to decode mesh: {}", path.display()))?;
    let mut report = MeshReport::new(path, &mesh);

    let Some(link) = mesh.skeleton_name.as_deref() else {
        return Ok(report);
    };
    if !options.resolve_skeleton {
        tracing::debug!("Skeleton resolution disabled, not following {}", link);
        return Ok(report);
    }

    let Some(skeleton_path) = options.resolver.resolve(path, link) else {
        let searched: Vec<String> = options
            .resolver
            .search_dirs(path)
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        tracing::warn!("Skeleton {} not found", link);
        report.warnings.push(format!(
            "skeleton '{}' not found (searched: {})",
            link,
            searched.join(", ")
        ));
        return Ok(report);
    };

    tracing::info!("Resolved skeleton {} -> {}", link, skeleton_path.display());
    match nether_ogre::load_skeleton(&skeleton_path) {
        Ok(skeleton) => {
            report
                .warnings
                .extend(check_bone_assignments(&mesh, &skeleton));
            report.skeleton = Some(SkeletonReport::new(&skeleton_path, &skeleton));
        }
        Err(e) => {
            tracing::warn!("Failed to decode skeleton {}: {}", skeleton_path.display(), e);
            report.warnings.push(format!(
                "skeleton '{}' failed to decode: {}",
                skeleton_path.display(),
                e
            ));
        }
    }
    Ok(report)
}

/// Decode a skeleton file
pub fn inspect_skeleton(path: &Path) -> Result<SkeletonReport> {
    let skeleton = nether_ogre::load_skeleton(path)
        .with_context(|| format!("Failed to decode skeleton: {}", path.display()))?;
    Ok(SkeletonReport::new(path, &skeleton))
}

/// Bone assignments whose handle has no bone in `skeleton`
pub fn check_bone_assignments(mesh: &Mesh, skeleton: &Skeleton) -> Vec<String> {
    let shared = mesh
        .shared_bone_assignments
        .iter()
        .map(|a| ("shared geometry".to_string(), a));
    let per_submesh = mesh.sub_meshes.iter().enumerate().flat_map(|(i, sub)| {
        sub.bone_assignments
            .iter()
            .map(move |a| (format!("submesh {}", i), a))
    });

    let mut warnings = Vec::new();
    let mut reported = std::collections::BTreeSet::new();
    for (owner, assignment) in shared.chain(per_submesh) {
        if skeleton.bone(assignment.bone_handle).is_none()
            && reported.insert((owner.clone(), assignment.bone_handle))
        {
            warnings.push(format!(
                "{} assigns vertices to bone {}, which the skeleton does not define",
                owner, assignment.bone_handle
            ));
        }
    }
    warnings
}
