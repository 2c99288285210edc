use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::path::{join, normalize, to_slash};

/// One entry of the alias table: `pattern` maps to each of `targets` in order.
///
/// Both may contain a single `*` wildcard. Targets are relative to the base
/// directory (or the project root when no base directory is configured).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    pub pattern: String,
    pub targets: Vec<String>,
}

impl PathAlias {
    pub fn new(pattern: impl Into<String>, targets: &[&str]) -> Self {
        Self {
            pattern: pattern.into(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Resolution settings of one project, as read from its compiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub root: PathBuf,
    /// Directory non-relative specifiers resolve against
    pub base_url: Option<PathBuf>,
    /// Alias table in declaration order
    pub paths: Vec<PathAlias>,
    /// Directories merged into one virtual directory for relative imports
    pub root_dirs: Vec<PathBuf>,
    /// Glob patterns of files belonging to the project (empty = everything)
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ProjectConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base: impl AsRef<Path>) -> Self {
        self.base_url = Some(self.root.join(base));
        self
    }

    pub fn with_alias(mut self, pattern: &str, targets: &[&str]) -> Self {
        self.paths.push(PathAlias::new(pattern, targets));
        self
    }

    pub fn with_root_dirs(mut self, dirs: &[&str]) -> Self {
        self.root_dirs = dirs.iter().map(|dir| self.root.join(dir)).collect();
        self
    }

    /// Project root as a normalized `/` path.
    pub fn root_key(&self) -> String {
        normalize(&to_slash(&self.root))
    }

    /// Base directory as a normalized `/` path.
    pub fn base_key(&self) -> Option<String> {
        self.base_url.as_deref().map(|base| normalize(&to_slash(base)))
    }

    /// Directory alias targets are relative to.
    pub fn alias_base_key(&self) -> String {
        self.base_key().unwrap_or_else(|| self.root_key())
    }

    pub fn root_dir_keys(&self) -> Vec<String> {
        let root = self.root_key();
        self.root_dirs
            .iter()
            .map(|dir| join(&root, &to_slash(dir)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_resolves_against_root() {
        let config = ProjectConfig::new("/p")
            .with_base_url("src")
            .with_alias("@app/*", &["app/*"])
            .with_root_dirs(&["src", "generated/src"]);

        assert_eq!(config.base_key().as_deref(), Some("/p/src"));
        assert_eq!(config.alias_base_key(), "/p/src");
        assert_eq!(config.root_dir_keys(), vec!["/p/src", "/p/generated/src"]);
        assert_eq!(config.paths[0].targets, vec!["app/*"]);
    }

    #[test]
    fn alias_base_defaults_to_root() {
        let config = ProjectConfig::new("/p/");
        assert_eq!(config.alias_base_key(), "/p");
    }
}
