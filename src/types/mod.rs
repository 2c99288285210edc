use serde::{Deserialize, Serialize};

/// A position in a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Byte offset from the start of the text
    pub offset: usize,
    /// Zero-based line
    pub line: u32,
    /// Zero-based column, in characters
    pub column: u32,
}

impl SourceLocation {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Result of scanning one file for imports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The file was parsed and its usage edges replaced
    Scanned { statements: usize },
    /// Content hash matched the previous scan; nothing changed
    Unchanged,
    /// Importable non-code file (style sheet, json, image); registered, never scanned
    Registered,
    /// The file no longer exists and was dropped from the index
    Removed,
}

impl ScanOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, ScanOutcome::Unchanged)
    }
}
