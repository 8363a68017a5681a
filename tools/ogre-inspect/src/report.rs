//! Inspection reports and their text / JSON rendering

use anyhow::{Context, Result};
use nether_ogre::{Geometry, Mesh, Skeleton, SubMesh, VertexBufferBinding};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::config::OutputFormat;

/// Summary of a decoded mesh
#[derive(Debug, Serialize)]
pub struct MeshReport {
    pub path: PathBuf,
    pub skeletally_animated: bool,
    pub index_count: usize,
    pub sub_meshes: Vec<SubMeshReport>,
    pub shared_geometry: Option<GeometryReport>,
    pub shared_bone_assignments: usize,
    pub bounds: Option<BoundsReport>,
    pub skeleton_link: Option<String>,
    /// Skeleton the link resolved to, if resolution was enabled and succeeded
    pub skeleton: Option<SkeletonReport>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubMeshReport {
    pub material: String,
    pub primitive: String,
    pub index_count: usize,
    pub uses_shared_vertices: bool,
    pub geometry: Option<GeometryReport>,
    pub bone_assignments: usize,
}

#[derive(Debug, Serialize)]
pub struct GeometryReport {
    pub vertex_count: u32,
    pub bindings: Vec<BindingReport>,
}

#[derive(Debug, Serialize)]
pub struct BindingReport {
    pub index: u16,
    pub stride: u16,
    pub bytes: usize,
    /// `usage[index]:format@offset`
    pub elements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BoundsReport {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub radius: f32,
}

/// Summary of a decoded skeleton
#[derive(Debug, Serialize)]
pub struct SkeletonReport {
    pub path: PathBuf,
    pub blend_mode: String,
    pub bone_count: usize,
    /// Length of the handle-indexed bone array, holes included
    pub slot_count: usize,
    pub bones: Vec<BoneReport>,
    /// Sorted by name
    pub animations: Vec<AnimationReport>,
}

#[derive(Debug, Serialize)]
pub struct BoneReport {
    pub handle: u16,
    pub name: String,
    pub parent: Option<u16>,
    pub children: Vec<u16>,
}

#[derive(Debug, Serialize)]
pub struct AnimationReport {
    pub name: String,
    pub length: f32,
    pub tracks: usize,
    pub key_frames: usize,
}

impl GeometryReport {
    fn new(geometry: &Geometry) -> Self {
        Self {
            vertex_count: geometry.vertex_count,
            bindings: geometry.bindings.values().map(BindingReport::new).collect(),
        }
    }
}

impl BindingReport {
    fn new(binding: &VertexBufferBinding) -> Self {
        Self {
            index: binding.binding_index,
            stride: binding.stride,
            bytes: binding.data.len(),
            elements: binding
                .layout
                .elements
                .iter()
                .map(|e| format!("{:?}[{}]:{:?}@{}", e.usage, e.usage_index, e.format, e.offset))
                .collect(),
        }
    }
}

impl SubMeshReport {
    fn new(sub: &SubMesh) -> Self {
        Self {
            material: sub.material_name.clone(),
            primitive: format!("{:?}", sub.primitive_type),
            index_count: sub.indices.len(),
            uses_shared_vertices: sub.uses_shared_vertices,
            geometry: sub.geometry.as_ref().map(GeometryReport::new),
            bone_assignments: sub.bone_assignments.len(),
        }
    }
}

impl MeshReport {
    pub fn new(path: &Path, mesh: &Mesh) -> Self {
        Self {
            path: path.to_path_buf(),
            skeletally_animated: mesh.skeletally_animated,
            index_count: mesh.index_count(),
            sub_meshes: mesh.sub_meshes.iter().map(SubMeshReport::new).collect(),
            shared_geometry: mesh.shared_geometry.as_ref().map(GeometryReport::new),
            shared_bone_assignments: mesh.shared_bone_assignments.len(),
            bounds: mesh.bounds.map(|b| BoundsReport {
                min: b.min.to_array(),
                max: b.max.to_array(),
                radius: b.radius,
            }),
            skeleton_link: mesh.skeleton_name.clone(),
            skeleton: None,
            warnings: Vec::new(),
        }
    }
}

impl SkeletonReport {
    pub fn new(path: &Path, skeleton: &Skeleton) -> Self {
        let mut animations: Vec<AnimationReport> = skeleton
            .animations
            .values()
            .map(|a| AnimationReport {
                name: a.name.clone(),
                length: a.length,
                tracks: a.tracks.len(),
                key_frames: a.tracks.iter().map(|t| t.key_frames.len()).sum(),
            })
            .collect();
        animations.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            path: path.to_path_buf(),
            blend_mode: format!("{:?}", skeleton.blend_mode),
            bone_count: skeleton.bone_count(),
            slot_count: skeleton.bones.len(),
            bones: skeleton
                .iter_bones()
                .map(|b| BoneReport {
                    handle: b.handle,
                    name: b.name.clone(),
                    parent: b.parent,
                    children: b.children.clone(),
                })
                .collect(),
            animations,
        }
    }
}

/// Plain-text rendering of a report
pub trait TextReport {
    fn write_text(&self, out: &mut String) -> std::fmt::Result;
}

impl TextReport for GeometryReport {
    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "    vertices: {}", self.vertex_count)?;
        for binding in &self.bindings {
            writeln!(
                out,
                "    binding {}: stride {}, {} bytes, [{}]",
                binding.index,
                binding.stride,
                binding.bytes,
                binding.elements.join(", ")
            )?;
        }
        Ok(())
    }
}

impl TextReport for MeshReport {
    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Mesh {}", self.path.display())?;
        writeln!(out, "  skeletally animated: {}", self.skeletally_animated)?;
        writeln!(out, "  indices: {}", self.index_count)?;

        if let Some(shared) = &self.shared_geometry {
            writeln!(out, "  shared geometry:")?;
            shared.write_text(out)?;
            writeln!(out, "    bone assignments: {}", self.shared_bone_assignments)?;
        }

        for (i, sub) in self.sub_meshes.iter().enumerate() {
            writeln!(
                out,
                "  submesh {}: '{}' {} ({} indices, {} bone assignments)",
                i, sub.material, sub.primitive, sub.index_count, sub.bone_assignments
            )?;
            match &sub.geometry {
                Some(geometry) => geometry.write_text(out)?,
                None => writeln!(out, "    uses shared vertices")?,
            }
        }

        if let Some(bounds) = &self.bounds {
            writeln!(
                out,
                "  bounds: {:?} .. {:?}, radius {}",
                bounds.min, bounds.max, bounds.radius
            )?;
        }

        if let Some(link) = &self.skeleton_link {
            writeln!(out, "  skeleton link: {}", link)?;
        }
        if let Some(skeleton) = &self.skeleton {
            skeleton.write_text(out)?;
        }

        for warning in &self.warnings {
            writeln!(out, "  warning: {}", warning)?;
        }
        Ok(())
    }
}

impl TextReport for SkeletonReport {
    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Skeleton {}", self.path.display())?;
        writeln!(
            out,
            "  bones: {} in {} slots, blend mode {}",
            self.bone_count, self.slot_count, self.blend_mode
        )?;

        // Depth-first from each root, children in link order
        let mut stack: Vec<(u16, usize)> = self
            .bones
            .iter()
            .rev()
            .filter(|b| b.parent.is_none())
            .map(|b| (b.handle, 0))
            .collect();
        while let Some((handle, depth)) = stack.pop() {
            let Some(bone) = self.bones.iter().find(|b| b.handle == handle) else {
                continue;
            };
            writeln!(out, "  {}{} #{}", "  ".repeat(depth + 1), bone.name, bone.handle)?;
            stack.extend(bone.children.iter().rev().map(|&c| (c, depth + 1)));
        }

        for animation in &self.animations {
            writeln!(
                out,
                "  animation '{}': {}s, {} tracks, {} keyframes",
                animation.name, animation.length, animation.tracks, animation.key_frames
            )?;
        }
        Ok(())
    }
}

/// Render a report in the requested format
pub fn render<T: Serialize + TextReport>(report: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            report
                .write_text(&mut out)
                .context("Failed to format report")?;
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out =
                serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton_report() -> SkeletonReport {
        SkeletonReport {
            path: PathBuf::from("rig.skeleton"),
            blend_mode: "Average".to_string(),
            bone_count: 3,
            slot_count: 4,
            bones: vec![
                BoneReport {
                    handle: 0,
                    name: "root".to_string(),
                    parent: None,
                    children: vec![3, 1],
                },
                BoneReport {
                    handle: 1,
                    name: "arm".to_string(),
                    parent: Some(0),
                    children: vec![],
                },
                BoneReport {
                    handle: 3,
                    name: "leg".to_string(),
                    parent: Some(0),
                    children: vec![],
                },
            ],
            animations: vec![AnimationReport {
                name: "Walk".to_string(),
                length: 1.5,
                tracks: 2,
                key_frames: 6,
            }],
        }
    }

    #[test]
    fn test_text_tree_follows_link_order() {
        let text = render(&skeleton_report(), OutputFormat::Text).unwrap();
        let root = text.find("root #0").unwrap();
        let leg = text.find("leg #3").unwrap();
        let arm = text.find("arm #1").unwrap();
        assert!(root < leg && leg < arm);
        assert!(text.contains("bones: 3 in 4 slots"));
        assert!(text.contains("animation 'Walk': 1.5s, 2 tracks, 6 keyframes"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = render(&skeleton_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["slot_count"], 4);
        assert_eq!(value["bones"][0]["children"], serde_json::json!([3, 1]));
        assert_eq!(value["bones"][0]["parent"], serde_json::Value::Null);
    }
}
