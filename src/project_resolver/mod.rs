//! Module-specifier resolution
//!
//! Maps the specifier written in an import statement to the file (or package) it
//! names, following the host compiler's rules closely enough to locate modules:
//! path aliases, base-directory lookup, virtual directory unions and relative paths.
//! The reverse direction computes the preferred specifier for importing a file.
//!
//! This is distinct from `parsing`, which only reads and writes statement text.
//! - project_resolver: "Which file does `@app/button` refer to from here?"
//! - parsing: "What does this import statement say, and how was it formatted?"

pub mod memo;
pub mod package;
pub mod path;
pub mod paths;
pub mod project_config;
pub mod provider;
pub mod resolver;

pub use package::{PackageLocator, PackageManifest, flatten_exports};
pub use paths::{PathAliasResolver, PathRule};
pub use project_config::{PathAlias, ProjectConfig};
pub use provider::{ConfigProvider, FileSystem, ManifestReader};
pub use resolver::{ImportPreference, ModuleLookup, ModuleResolver, Resolution};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// A package manifest could not be read
    #[error("failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A package manifest was read but is not valid JSON of the expected shape
    #[error("invalid manifest '{path}': {details}")]
    InvalidManifest { path: PathBuf, details: String },
    /// A path-alias pattern cannot be compiled
    #[error("invalid path pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },
}

impl ResolutionError {
    pub fn manifest_read(path: PathBuf, source: std::io::Error) -> Self {
        Self::ManifestRead { path, source }
    }
    pub fn invalid_manifest(path: PathBuf, details: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path,
            details: details.into(),
        }
    }
    pub fn invalid_pattern(pattern: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            details: details.into(),
        }
    }
    /// Stable code for programmatic handling in JSON responses
    pub fn status_code(&self) -> String {
        match self {
            ResolutionError::ManifestRead { .. } => "RESOLUTION_MANIFEST_READ",
            ResolutionError::InvalidManifest { .. } => "RESOLUTION_INVALID_MANIFEST",
            ResolutionError::InvalidPattern { .. } => "RESOLUTION_INVALID_PATTERN",
        }
        .to_string()
    }
    /// Recovery suggestions list (mirrors project error conventions)
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ResolutionError::ManifestRead { .. } => vec![
                "Run your package manager's install command",
                "Check permissions on node_modules",
            ],
            ResolutionError::InvalidManifest { .. } => vec![
                "Reinstall the affected package",
                "Remove node_modules and install again",
            ],
            ResolutionError::InvalidPattern { .. } => vec![
                "Use a single '*' wildcard per alias pattern",
                "Check the paths section of your project configuration",
            ],
        }
    }
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;
