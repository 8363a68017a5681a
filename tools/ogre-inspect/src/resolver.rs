//! Skeleton link resolution
//!
//! A mesh names its skeleton by resource name only. The file is looked up
//! next to the mesh first, then in each configured search path.

use std::path::{Path, PathBuf};

/// Finds the `.skeleton` file a mesh links to
#[derive(Debug, Clone, Default)]
pub struct SkeletonResolver {
    search_paths: Vec<PathBuf>,
}

impl SkeletonResolver {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Directories tried for a mesh at `mesh_path`, in lookup order
    pub fn search_dirs(&self, mesh_path: &Path) -> Vec<PathBuf> {
        let mesh_dir = mesh_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        std::iter::once(mesh_dir)
            .chain(self.search_paths.iter().cloned())
            .collect()
    }

    /// First existing file for `skeleton_name`, if any
    ///
    /// The name is tried as given, then by its file name alone, so a link
    /// such as `models/ninja.skeleton` still matches a flat search path.
    pub fn resolve(&self, mesh_path: &Path, skeleton_name: &str) -> Option<PathBuf> {
        let name = Path::new(skeleton_name);
        if name.is_absolute() {
            return name.is_file().then(|| name.to_path_buf());
        }

        let bare = name.file_name().map(Path::new).filter(|bare| *bare != name);
        for dir in self.search_dirs(mesh_path) {
            for candidate in std::iter::once(name).chain(bare) {
                let path = dir.join(candidate);
                tracing::trace!("Trying {}", path.display());
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_next_to_mesh() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("ninja.skeleton"), b"").unwrap();

        let resolver = SkeletonResolver::default();
        let mesh = dir.path().join("ninja.mesh");
        assert_eq!(
            resolver.resolve(&mesh, "ninja.skeleton"),
            Some(dir.path().join("ninja.skeleton"))
        );
        assert_eq!(resolver.resolve(&mesh, "robot.skeleton"), None);
    }

    #[test]
    fn test_resolve_search_path_order() {
        let models = tempdir().unwrap();
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        std::fs::write(first.path().join("rig.skeleton"), b"").unwrap();
        std::fs::write(second.path().join("rig.skeleton"), b"").unwrap();

        let resolver = SkeletonResolver::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let mesh = models.path().join("hero.mesh");
        assert_eq!(
            resolver.resolve(&mesh, "rig.skeleton"),
            Some(first.path().join("rig.skeleton"))
        );

        // The mesh's own directory wins over search paths
        std::fs::write(models.path().join("rig.skeleton"), b"").unwrap();
        assert_eq!(
            resolver.resolve(&mesh, "rig.skeleton"),
            Some(models.path().join("rig.skeleton"))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_file_name() {
        let models = tempdir().unwrap();
        let rigs = tempdir().unwrap();
        std::fs::write(rigs.path().join("rig.skeleton"), b"").unwrap();

        let resolver = SkeletonResolver::new(vec![rigs.path().to_path_buf()]);
        let mesh = models.path().join("hero.mesh");
        assert_eq!(
            resolver.resolve(&mesh, "exports/rigs/rig.skeleton"),
            Some(rigs.path().join("rig.skeleton"))
        );
    }

    #[test]
    fn test_search_dirs_start_with_mesh_dir() {
        let resolver = SkeletonResolver::new(vec![PathBuf::from("/opt/rigs")]);
        let dirs = resolver.search_dirs(Path::new("assets/hero.mesh"));
        assert_eq!(
            dirs,
            vec![PathBuf::from("assets"), PathBuf::from("/opt/rigs")]
        );
    }
}
