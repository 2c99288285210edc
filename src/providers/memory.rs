//! In-memory file system for tests and embedding hosts

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::filter::FileFilter;
use crate::config::IndexingConfig;
use crate::error::{IndexError, IndexResult};
use crate::project_resolver::path::{normalize, to_slash};
use crate::project_resolver::{FileSystem, ProjectConfig};

/// Files keyed by normalized `/` path.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<String, String>>,
    indexing: IndexingConfig,
}

fn key(path: &Path) -> String {
    normalize(&to_slash(path))
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indexing(indexing: IndexingConfig) -> Self {
        Self {
            files: RwLock::default(),
            indexing,
        }
    }

    /// Create or overwrite a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.write().insert(key(path.as_ref()), content.into());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) -> bool {
        self.files.write().remove(&key(path.as_ref())).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(&self, config: &ProjectConfig) -> IndexResult<Vec<PathBuf>> {
        let mut exclude = config.exclude.clone();
        exclude.extend(self.indexing.ignore_patterns.iter().cloned());
        let filter = FileFilter::new(
            &config.root,
            &config.include,
            &exclude,
            &self.indexing.extensions,
        )?;

        let root = config.root_key();
        let prefix = format!("{}/", root.trim_end_matches('/'));
        Ok(self
            .files
            .read()
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .map(PathBuf::from)
            .filter(|path| filter.accepts(path))
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(&key(path))
    }

    fn read_to_string(&self, path: &Path) -> IndexResult<String> {
        self.files.read().get(&key(path)).cloned().ok_or_else(|| {
            IndexError::file_read(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }
}
