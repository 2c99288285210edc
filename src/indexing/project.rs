//! One project: its configuration, resolver and index.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::index::ProjectIndex;
use crate::error::{IndexError, IndexResult};
use crate::project_resolver::path::{is_within, normalize, parent, to_slash};
use crate::project_resolver::{
    FileSystem, ImportPreference, ManifestReader, ModuleResolver, PackageLocator, ProjectConfig,
    Resolution,
};
use crate::specifier::Specifier;
use crate::types::ScanOutcome;

/// Counts reported after a (re)build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub files: usize,
    pub registered: usize,
    pub scanned: usize,
    pub failed: usize,
}

pub struct Project {
    config: ProjectConfig,
    root_key: String,
    resolver: ModuleResolver,
    index: ProjectIndex,
    fs: Arc<dyn FileSystem>,
    packages: PackageLocator,
}

impl Project {
    pub fn new(
        config: ProjectConfig,
        fs: Arc<dyn FileSystem>,
        manifests: Arc<dyn ManifestReader>,
    ) -> IndexResult<Self> {
        let resolver = ModuleResolver::new(&config)?;
        Ok(Self {
            root_key: config.root_key(),
            config,
            resolver,
            index: ProjectIndex::new(),
            packages: PackageLocator::new(fs.clone(), manifests),
            fs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut ProjectIndex {
        &mut self.index
    }

    /// Whether `path` lies inside the project root.
    pub fn contains(&self, path: &Path) -> bool {
        is_within(&self.root_key, &normalize(&to_slash(path)))
    }

    /// Register every file first so that scans can resolve against the full registry.
    pub fn register_files(&mut self, files: &[PathBuf]) -> usize {
        files
            .iter()
            .filter(|file| self.index.register_source_module(file))
            .count()
    }

    /// Read and scan one file.
    ///
    /// A file that no longer exists is unregistered instead. Non-code files are
    /// only registered; their content is never read.
    pub fn rescan_file(&mut self, path: &Path, force: bool) -> IndexResult<ScanOutcome> {
        if !Specifier::parse(&to_slash(path)).is_code {
            if !self.fs.exists(path) {
                debug!("{} is gone", path.display());
                self.index.unregister_source_module(path);
                return Ok(ScanOutcome::Removed);
            }
            self.index.register_source_module(path);
            return Ok(ScanOutcome::Registered);
        }

        let content = match self.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if !self.fs.exists(path) => {
                debug!("{} is gone: {e}", path.display());
                self.index.unregister_source_module(path);
                return Ok(ScanOutcome::Removed);
            }
            Err(e) => return Err(e),
        };

        self.index.register_source_module(path);
        Ok(self
            .index
            .scan_module_for_imports(path, &content, &self.resolver, force))
    }

    /// Scan one file as part of a build.
    pub fn scan_into(&mut self, file: &Path, summary: &mut BuildSummary) {
        match self.rescan_file(file, true) {
            Ok(ScanOutcome::Registered) => {}
            Ok(_) => summary.scanned += 1,
            Err(e) => {
                warn!("failed to scan {}: {e}", file.display());
                summary.failed += 1;
            }
        }
    }

    /// First build step: drop everything and register the file list.
    pub fn reset(&mut self, files: &[PathBuf]) -> BuildSummary {
        self.index.clear();
        self.packages.clear_cache();
        BuildSummary {
            files: files.len(),
            registered: self.register_files(files),
            ..Default::default()
        }
    }

    /// Last build step, after every file was scanned.
    pub fn finish(&mut self, summary: BuildSummary) -> BuildSummary {
        let pruned = self.index.prune_unused_patterns();
        info!(
            "built {}: {} files, {} scanned, {} failed, {pruned} patterns pruned",
            self.config.root.display(),
            summary.files,
            summary.scanned,
            summary.failed
        );
        summary
    }

    /// Synchronous full build: clear, register, scan, prune.
    pub fn build(&mut self, files: &[PathBuf]) -> BuildSummary {
        let mut summary = self.reset(files);
        for file in files {
            self.scan_into(file, &mut summary);
        }
        self.finish(summary)
    }

    pub fn resolve(&self, importing_file: &Path, specifier: &str) -> Resolution {
        let importing_dir = parent(&normalize(&to_slash(importing_file)));
        self.resolver.resolve(&importing_dir, specifier, &self.index)
    }

    pub fn best_specifier(
        &self,
        importing_file: &Path,
        target: &str,
        preference: ImportPreference,
    ) -> String {
        self.resolver
            .best_specifier(&to_slash(importing_file), target, preference)
    }

    /// Files that `specifier` may refer to. May return several.
    pub fn locate(&self, importing_file: &Path, specifier: &str) -> Vec<PathBuf> {
        match self.resolve(importing_file, specifier) {
            Resolution::Source(key) => {
                let mut files = self.packages.probe_source(&key);
                if let Some(module) = self.index.source_module(&key) {
                    if !files.contains(&module.path) {
                        files.insert(0, module.path.clone());
                    }
                }
                files
            }
            Resolution::External(specifier) => {
                let importing_dir = parent(&normalize(&to_slash(importing_file)));
                self.packages.locate(&importing_dir, &specifier)
            }
            Resolution::Unresolved => Vec::new(),
        }
    }

    /// Fails with `ProjectNotFound` when `path` is outside the project.
    pub fn ensure_contains(&self, path: &Path) -> IndexResult<()> {
        if self.contains(path) {
            Ok(())
        } else {
            Err(IndexError::ProjectNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{JsonManifestReader, MemoryFileSystem};

    fn project(fs: Arc<MemoryFileSystem>) -> Project {
        let config = ProjectConfig::new("/p").with_base_url("src");
        let manifests = Arc::new(JsonManifestReader::new(fs.clone()));
        Project::new(config, fs, manifests).unwrap()
    }

    #[test]
    fn build_and_query() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/p/src/a.ts", "import { b } from 'b';\nimport x from 'pkg';\n");
        fs.add_file("/p/src/b.ts", "export const b = 1;\n");
        let mut project = project(fs.clone());

        let files = vec![PathBuf::from("/p/src/a.ts"), PathBuf::from("/p/src/b.ts")];
        let summary = project.build(&files);
        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.registered, 2);
        assert_eq!(project.index().incoming_count("/p/src/b"), 1);
        assert_eq!(project.index().incoming_count("pkg"), 1);
        assert!(project.contains(Path::new("/p/src/a.ts")));
        assert!(!project.contains(Path::new("/other/a.ts")));
    }

    #[test]
    fn missing_file_is_unregistered() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/p/src/a.ts", "import x from 'pkg';\n");
        let mut project = project(fs.clone());
        project.build(&[PathBuf::from("/p/src/a.ts")]);

        fs.remove_file("/p/src/a.ts");
        let outcome = project.rescan_file(Path::new("/p/src/a.ts"), false).unwrap();
        assert_eq!(outcome, ScanOutcome::Removed);
        assert!(project.index().source_module("/p/src/a").is_none());
        assert_eq!(project.index().incoming_count("pkg"), 0);
    }

    #[test]
    fn locate_package_entry_points() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/p/src/a.ts", "");
        fs.add_file(
            "/p/node_modules/pkg/package.json",
            r#"{ "name": "pkg", "types": "./lib/index.d.ts", "main": "./lib/index.js" }"#,
        );
        fs.add_file("/p/node_modules/pkg/lib/index.d.ts", "");
        fs.add_file("/p/node_modules/pkg/lib/index.js", "");
        fs.add_file("/p/node_modules/@types/other/index.d.ts", "");
        let mut project = project(fs.clone());
        project.build(&[PathBuf::from("/p/src/a.ts")]);

        let from = Path::new("/p/src/a.ts");
        assert_eq!(
            project.locate(from, "pkg"),
            vec![
                PathBuf::from("/p/node_modules/pkg/lib/index.d.ts"),
                PathBuf::from("/p/node_modules/pkg/lib/index.js"),
            ]
        );
        assert_eq!(
            project.locate(from, "other"),
            vec![PathBuf::from("/p/node_modules/@types/other/index.d.ts")]
        );
        assert_eq!(project.locate(from, "a"), vec![PathBuf::from("/p/src/a.ts")]);
        assert!(project.locate(from, "./nothing").is_empty());
    }
}
