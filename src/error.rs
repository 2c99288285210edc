//! Error types for the import index
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Soft outcomes (statements the
//! parser does not understand, unresolved specifiers, merge conflicts) are not
//! errors and never appear here.

use std::path::PathBuf;
use thiserror::Error;

use crate::project_resolver::ResolutionError;

/// Main error type for indexing operations
#[derive(Error, Debug)]
pub enum IndexError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to enumerate files under '{root}': {reason}")]
    FileWalk { root: PathBuf, reason: String },

    /// The project configuration could not be loaded; no index is built
    #[error("Failed to load project configuration '{path}': {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("No open project contains '{path}'")]
    ProjectNotFound { path: PathBuf },

    #[error("Edit range {offset}..{end} is outside the document (length {len})")]
    EditOutOfRange { offset: usize, end: usize, len: usize },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn config_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR".to_string(),
            Self::FileWalk { .. } => "FILE_WALK_ERROR".to_string(),
            Self::ConfigLoad { .. } => "CONFIG_LOAD_ERROR".to_string(),
            Self::ProjectNotFound { .. } => "PROJECT_NOT_FOUND".to_string(),
            Self::EditOutOfRange { .. } => "EDIT_OUT_OF_RANGE".to_string(),
            Self::Resolution(inner) => inner.status_code(),
            Self::General(_) => "GENERAL_ERROR".to_string(),
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::ConfigLoad { .. } => vec![
                "Fix the syntax of tsconfig.json (comments and trailing commas are allowed)",
                "Check that every file named in 'extends' exists and the chain has no cycles",
            ],
            Self::ProjectNotFound { .. } => vec![
                "Open the project root that contains the file first",
                "Check that the file is not excluded by the project configuration",
            ],
            Self::Resolution(inner) => inner.recovery_suggestions(),
            _ => vec![],
        }
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_keep_their_code() {
        let err: IndexError = ResolutionError::invalid_pattern("a/*/*", "two wildcards").into();
        assert_eq!(err.status_code(), "RESOLUTION_INVALID_PATTERN");
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn config_load_message_names_file() {
        let err = IndexError::config_load("/p/tsconfig.json", "unexpected token");
        assert!(err.to_string().contains("/p/tsconfig.json"));
        assert_eq!(err.status_code(), "CONFIG_LOAD_ERROR");
    }
}
