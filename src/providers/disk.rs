//! File system walker and accessor for projects on disk
//!
//! Directory traversal supports:
//! - .gitignore rules (optional)
//! - `.importerignore` files
//! - include/exclude globs from the project configuration
//! - ignore patterns and extensions from settings

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::filter::FileFilter;
use crate::config::IndexingConfig;
use crate::error::{IndexError, IndexResult};
use crate::project_resolver::{FileSystem, ProjectConfig};

/// Custom ignore file honoured next to .gitignore
pub const IGNORE_FILE_NAME: &str = ".importerignore";

#[derive(Debug, Clone, Default)]
pub struct DiskFileSystem {
    indexing: IndexingConfig,
}

impl DiskFileSystem {
    pub fn new(indexing: IndexingConfig) -> Self {
        Self { indexing }
    }
}

impl FileSystem for DiskFileSystem {
    fn list_files(&self, config: &ProjectConfig) -> IndexResult<Vec<PathBuf>> {
        let mut exclude = config.exclude.clone();
        exclude.extend(self.indexing.ignore_patterns.iter().cloned());
        let filter = FileFilter::new(
            &config.root,
            &config.include,
            &exclude,
            &self.indexing.extensions,
        )?;

        let mut builder = WalkBuilder::new(&config.root);
        builder
            .hidden(true) // Skip hidden files and directories
            .git_ignore(self.indexing.respect_gitignore)
            .git_global(self.indexing.respect_gitignore)
            .git_exclude(self.indexing.respect_gitignore)
            .follow_links(false)
            .require_git(false) // Allow gitignore to work in non-git directories
            .overrides(filter.overrides());
        builder.add_custom_ignore_filename(IGNORE_FILE_NAME);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Unreadable entries are skipped, not fatal
                    debug!("skipping entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if filter.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> IndexResult<String> {
        std::fs::read_to_string(path).map_err(|e| IndexError::file_read(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_walk_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/main.ts", "import './lib';");
        write(root, "src/lib.tsx", "");
        write(root, "src/style.css", "");
        write(root, "README.md", "# Test");
        write(root, "node_modules/pkg/index.js", "");
        write(root, "dist/out.js", "");

        let fs = DiskFileSystem::default();
        let files = fs.list_files(&ProjectConfig::new(root)).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("src/main.ts")));
        assert!(files.iter().any(|p| p.ends_with("src/lib.tsx")));
        assert!(files.iter().any(|p| p.ends_with("src/style.css")));
    }

    #[test]
    fn test_gitignore_and_custom_ignore_respected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, ".gitignore", "ignored.ts\n");
        write(root, IGNORE_FILE_NAME, "generated/\n");
        write(root, "ignored.ts", "");
        write(root, "included.ts", "");
        write(root, "generated/types.ts", "");
        write(root, ".hidden/x.ts", "");

        let files = DiskFileSystem::default()
            .list_files(&ProjectConfig::new(root))
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("included.ts"));
    }

    #[test]
    fn test_include_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/a.ts", "");
        write(root, "scripts/b.ts", "");

        let mut config = ProjectConfig::new(root);
        config.include = vec!["src".to_string()];
        let files = DiskFileSystem::default().list_files(&config).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/a.ts"));
    }

    #[test]
    fn test_read_and_exists() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.ts", "export {}");
        let fs = DiskFileSystem::default();

        assert!(fs.exists(&temp_dir.path().join("a.ts")));
        assert!(!fs.exists(temp_dir.path()));
        assert_eq!(fs.read_to_string(&temp_dir.path().join("a.ts")).unwrap(), "export {}");
        assert!(fs.read_to_string(&temp_dir.path().join("b.ts")).is_err());
    }
}
