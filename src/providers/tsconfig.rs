//! tsconfig.json / jsconfig.json loading
//!
//! Handles JSONC parsing, extends chain resolution, and conversion of the
//! resolution-related compiler options into a [`ProjectConfig`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::project_resolver::path::{join, normalize, relative_path, to_slash};
use crate::project_resolver::{ConfigProvider, PathAlias, ProjectConfig};

/// Config file names tried in each project root, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// `extends` accepts one config or (since TypeScript 5.0) a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn entries(&self) -> Vec<&str> {
        match self {
            Extends::One(entry) => vec![entry.as_str()],
            Extends::Many(entries) => entries.iter().map(String::as_str).collect(),
        }
    }
}

/// Compiler options subset for module resolution
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Kept as a JSON map so declaration order survives
    #[serde(default)]
    pub paths: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub root_dirs: Option<Vec<String>>,
}

/// Minimal tsconfig.json representation for path resolution
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<Extends>,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

/// A config with every path made absolute against the file that declared it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTsConfig {
    pub base_url: Option<String>,
    /// Alias table with absolute targets
    pub paths: Option<Vec<PathAlias>>,
    pub root_dirs: Option<Vec<String>>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

/// JSONC parsing helper using json5 for comment and trailing comma support
pub fn parse_jsonc_tsconfig(content: &str) -> Result<TsConfig, json5::Error> {
    json5::from_str(content)
}

/// Read and parse a tsconfig.json file with JSONC support
pub fn read_tsconfig(path: &Path) -> IndexResult<TsConfig> {
    let content =
        std::fs::read_to_string(path).map_err(|e| IndexError::config_load(path, e.to_string()))?;
    parse_jsonc_tsconfig(&content).map_err(|e| IndexError::config_load(path, e.to_string()))
}

impl TsConfig {
    /// Make every path absolute relative to `dir`, the directory of the declaring file.
    ///
    /// `inherited_base` is the baseUrl of the extended configs, if any.
    fn resolve_paths(
        &self,
        dir: &str,
        inherited_base: Option<&str>,
    ) -> IndexResult<ResolvedTsConfig> {
        let options = &self.compiler_options;
        let base_url = options.base_url.as_deref().map(|base| join(dir, base));

        let paths = match &options.paths {
            Some(map) => {
                // Targets are relative to baseUrl, or to the declaring file without one
                let targets_base = base_url
                    .clone()
                    .or_else(|| inherited_base.map(str::to_string))
                    .unwrap_or_else(|| dir.to_string());
                let mut aliases = Vec::with_capacity(map.len());
                for (pattern, targets) in map {
                    let targets: Vec<String> = serde_json::from_value(targets.clone())
                        .map_err(|e| {
                            IndexError::config_load(dir, format!("paths['{pattern}']: {e}"))
                        })?;
                    aliases.push(PathAlias {
                        pattern: pattern.clone(),
                        targets: targets.iter().map(|t| join(&targets_base, t)).collect(),
                    });
                }
                Some(aliases)
            }
            None => None,
        };

        let absolute = |items: &Option<Vec<String>>| {
            items
                .as_ref()
                .map(|items| items.iter().map(|item| join(dir, item)).collect())
        };

        Ok(ResolvedTsConfig {
            base_url,
            paths,
            root_dirs: absolute(&options.root_dirs),
            include: absolute(&self.include),
            exclude: absolute(&self.exclude),
        })
    }
}

impl ResolvedTsConfig {
    /// Child values replace parent values field by field.
    fn overlay(parent: ResolvedTsConfig, child: ResolvedTsConfig) -> ResolvedTsConfig {
        ResolvedTsConfig {
            base_url: child.base_url.or(parent.base_url),
            paths: child.paths.or(parent.paths),
            root_dirs: child.root_dirs.or(parent.root_dirs),
            include: child.include.or(parent.include),
            exclude: child.exclude.or(parent.exclude),
        }
    }

    pub fn into_project_config(self, root: &Path) -> ProjectConfig {
        let root_key = normalize(&to_slash(root));
        let relative_globs = |globs: Option<Vec<String>>| -> Vec<String> {
            globs
                .unwrap_or_default()
                .iter()
                .map(|glob| match relative_path(&root_key, glob) {
                    relative if relative.is_empty() => "**".to_string(),
                    relative => relative,
                })
                .collect()
        };
        ProjectConfig {
            root: root.to_path_buf(),
            base_url: self.base_url.map(PathBuf::from),
            paths: self.paths.unwrap_or_default(),
            root_dirs: self
                .root_dirs
                .unwrap_or_default()
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            include: relative_globs(self.include),
            exclude: relative_globs(self.exclude),
        }
    }
}

/// Locate the file an `extends` entry names.
fn extends_target(config_dir: &Path, entry: &str) -> PathBuf {
    let with_json = |path: PathBuf| {
        if path.is_dir() {
            path.join("tsconfig.json")
        } else if path.extension().is_none() {
            path.with_extension("json")
        } else {
            path
        }
    };

    let path = Path::new(entry);
    if path.is_absolute() || entry.starts_with('.') {
        return with_json(config_dir.join(path));
    }
    // Package-provided base config, e.g. "@tsconfig/node20/tsconfig.json"
    for dir in config_dir.ancestors() {
        let candidate = with_json(dir.join("node_modules").join(entry));
        if candidate.is_file() {
            return candidate;
        }
    }
    with_json(config_dir.join(path))
}

/// Resolve extends chain and merge configurations
///
/// Follows TypeScript's extends resolution rules:
/// 1. Relative paths are resolved relative to the extending config
/// 2. Configurations are merged with child overriding parent
/// 3. Cycle detection prevents infinite recursion
pub fn resolve_extends_chain(
    config_path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> IndexResult<ResolvedTsConfig> {
    let canonical_path = config_path
        .canonicalize()
        .map_err(|e| IndexError::config_load(config_path, e.to_string()))?;

    if !visited.insert(canonical_path.clone()) {
        return Err(IndexError::config_load(
            &canonical_path,
            "circular extends chain",
        ));
    }

    let config = read_tsconfig(&canonical_path)?;
    let config_dir = canonical_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut merged = ResolvedTsConfig::default();
    if let Some(extends) = &config.extends {
        // Later entries override earlier ones
        for entry in extends.entries() {
            let parent_path = extends_target(&config_dir, entry);
            let parent = resolve_extends_chain(&parent_path, visited)?;
            merged = ResolvedTsConfig::overlay(merged, parent);
        }
    }
    let own = config.resolve_paths(
        &normalize(&to_slash(&config_dir)),
        merged.base_url.as_deref(),
    )?;
    merged = ResolvedTsConfig::overlay(merged, own);

    visited.remove(&canonical_path);
    Ok(merged)
}

/// Reads the project's tsconfig.json (or jsconfig.json).
#[derive(Debug, Clone, Default)]
pub struct TsConfigProvider;

impl TsConfigProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn find_config(&self, root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }
}

impl ConfigProvider for TsConfigProvider {
    fn load(&self, root: &Path) -> IndexResult<ProjectConfig> {
        let Some(path) = self.find_config(root) else {
            debug!("no compiler configuration in {}", root.display());
            return Ok(ProjectConfig::new(root));
        };
        let resolved = resolve_extends_chain(&path, &mut HashSet::new())?;
        debug!("loaded {}", path.display());
        Ok(resolved.into_project_config(root))
    }
}
