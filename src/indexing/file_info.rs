//! Per-file scan bookkeeping
//!
//! A rescan request for a file whose content hash has not changed since the last
//! scan is answered without touching the usage graphs.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// What the index remembers about the last scan of a file
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Hex SHA-256 of the scanned content
    pub hash: String,
    pub scanned_at: DateTime<Utc>,
    /// Import statements recognized in the last scan
    pub statements: usize,
}

impl FileInfo {
    pub fn new(path: PathBuf, content: &str, statements: usize) -> Self {
        Self {
            path,
            hash: calculate_hash(content),
            scanned_at: Utc::now(),
            statements,
        }
    }

    pub fn has_changed(&self, content: &str) -> bool {
        self.hash != calculate_hash(content)
    }
}

pub fn calculate_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{digest:x}")
}
