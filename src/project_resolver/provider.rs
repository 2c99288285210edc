//! Seams between the resolution engine and its environment

use std::path::{Path, PathBuf};

use super::ResolutionResult;
use super::package::PackageManifest;
use super::project_config::ProjectConfig;
use crate::error::IndexResult;

/// Produces the resolution settings for a project root.
///
/// The default implementation reads `tsconfig.json`; tests and embedders supply
/// their own to avoid touching disk.
pub trait ConfigProvider: Send + Sync {
    fn load(&self, root: &Path) -> IndexResult<ProjectConfig>;
}

/// File access used for enumeration and existence probing.
pub trait FileSystem: Send + Sync {
    /// Source files belonging to the project described by `config`
    fn list_files(&self, config: &ProjectConfig) -> IndexResult<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> IndexResult<String>;
}

/// Reads package manifests (`package.json`).
pub trait ManifestReader: Send + Sync {
    fn read_manifest(&self, path: &Path) -> ResolutionResult<PackageManifest>;
}
