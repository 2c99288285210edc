//! Project index, usage graphs and their maintenance
//!
//! - `index`: registries of importable modules and import patterns
//! - `usage`: who imports what, and where
//! - `project`: one project's config, resolver and index
//! - `workspace`: open projects with debounced rescans

pub mod file_info;
pub mod index;
pub mod modules;
pub mod project;
pub mod scheduler;
pub mod usage;
pub mod workspace;

pub use file_info::{FileInfo, calculate_hash};
pub use index::{IndexStats, ProjectIndex, importer_key};
pub use modules::{NodeModule, ProjectModule, SourceModule, SourceModuleImport, SourceSymbolImport};
pub use project::{BuildSummary, Project};
pub use scheduler::{Debouncer, Fired};
pub use usage::UsageGraph;
pub use workspace::{DebounceKey, TaskOutcome, Workspace, WorkspaceTask};
