//! `package.json` reader

use std::path::Path;
use std::sync::Arc;

use crate::error::IndexError;
use crate::project_resolver::{
    FileSystem, ManifestReader, PackageManifest, ResolutionError, ResolutionResult,
};

/// Reads manifests through a [`FileSystem`] and parses them with serde_json.
pub struct JsonManifestReader {
    fs: Arc<dyn FileSystem>,
}

impl JsonManifestReader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl ManifestReader for JsonManifestReader {
    fn read_manifest(&self, path: &Path) -> ResolutionResult<PackageManifest> {
        let content = self.fs.read_to_string(path).map_err(|e| {
            let source = match e {
                IndexError::FileRead { source, .. } => source,
                other => std::io::Error::other(other.to_string()),
            };
            ResolutionError::manifest_read(path.to_path_buf(), source)
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ResolutionError::invalid_manifest(path.to_path_buf(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryFileSystem;

    #[test]
    fn parses_and_reports_errors() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file(
            "/n/pkg/package.json",
            r#"{ "name": "pkg", "version": "1.0.0", "typings": "index.d.ts" }"#,
        );
        fs.add_file("/n/bad/package.json", "{ not json");
        let reader = JsonManifestReader::new(fs);

        let manifest = reader.read_manifest(Path::new("/n/pkg/package.json")).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("pkg"));
        assert_eq!(manifest.typings.as_deref(), Some("index.d.ts"));

        let bad = reader.read_manifest(Path::new("/n/bad/package.json")).unwrap_err();
        assert_eq!(bad.status_code(), "RESOLUTION_INVALID_MANIFEST");
        let missing = reader.read_manifest(Path::new("/n/none/package.json")).unwrap_err();
        assert_eq!(missing.status_code(), "RESOLUTION_MANIFEST_READ");
    }
}
