//! Import statement indexing for JavaScript and TypeScript projects
//!
//! Parses import statements without losing formatting, resolves their module
//! specifiers the way the compiler does, keeps per-project usage graphs, and plans
//! the edit that adds a new import to a file.

pub mod config;
pub mod edit;
pub mod error;
pub mod indexing;
pub mod parsing;
pub mod project_resolver;
pub mod providers;
pub mod specifier;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use edit::{Editor, ImportRequest, TextBuffer, TextEdit, plan_import};
pub use error::{IndexError, IndexResult};
pub use indexing::{Project, ProjectIndex, Workspace, WorkspaceTask};
pub use parsing::{ImportKind, ImportParser, ImportStatement, ImportStyle, ImportSymbol};
pub use project_resolver::{
    ImportPreference, ModuleResolver, ProjectConfig, Resolution, ResolutionError,
    ResolutionResult,
};
pub use specifier::Specifier;
pub use types::{ScanOutcome, SourceLocation};
