//! ogre-inspect.toml parsing
//!
//! Every section is optional; a missing file means defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "ogre-inspect.toml";

/// ogre-inspect.toml structure
#[derive(Debug, Default, Deserialize)]
pub struct InspectConfig {
    #[serde(default)]
    pub resolver: ResolverSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Skeleton link resolution
#[derive(Debug, Deserialize)]
pub struct ResolverSection {
    /// Directories searched after the mesh's own directory, in order.
    /// Relative entries are taken relative to the config file.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Load the skeleton a mesh links to and check its bone assignments.
    /// Default: true
    #[serde(default = "default_resolve_skeletons")]
    pub resolve_skeletons: bool,
}

fn default_resolve_skeletons() -> bool {
    true
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            resolve_skeletons: default_resolve_skeletons(),
        }
    }
}

/// Report output section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl InspectConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        if let Some(base) = path.parent() {
            for search_path in &mut config.resolver.search_paths {
                if search_path.is_relative() {
                    *search_path = base.join(&*search_path);
                }
            }
        }
        Ok(config)
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse ogre-inspect.toml")
    }

    /// Load an explicit config, or `ogre-inspect.toml` from `dir` if present
    ///
    /// An explicit path must exist; the implicit one may be absent.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let implicit = dir.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!("Using config {}", implicit.display());
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_empty() {
        let config = InspectConfig::parse("").unwrap();
        assert!(config.resolver.search_paths.is_empty());
        assert!(config.resolver.resolve_skeletons);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_config_full() {
        let config = InspectConfig::parse(
            r#"
[resolver]
search_paths = ["skeletons", "/opt/media"]
resolve_skeletons = false

[output]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(
            config.resolver.search_paths,
            vec![PathBuf::from("skeletons"), PathBuf::from("/opt/media")]
        );
        assert!(!config.resolver.resolve_skeletons);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_unknown_format() {
        assert!(InspectConfig::parse("[output]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_load_resolves_relative_search_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[resolver]\nsearch_paths = [\"rigs\"]\n").unwrap();

        let config = InspectConfig::load(&path).unwrap();
        assert_eq!(config.resolver.search_paths, vec![dir.path().join("rigs")]);
    }

    #[test]
    fn test_discover() {
        let dir = tempdir().unwrap();

        // Nothing on disk: defaults
        let config = InspectConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Text);

        // Explicit path that does not exist is an error
        let missing = dir.path().join("missing.toml");
        assert!(InspectConfig::discover(Some(&missing), dir.path()).is_err());

        // Implicit file is picked up
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[output]\nformat = \"json\"\n",
        )
        .unwrap();
        let config = InspectConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }
}
