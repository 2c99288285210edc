//! Configuration module for the import index.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `IMPORTER_` and use double underscores
//! to separate nested levels:
//! - `IMPORTER_RESOLUTION__PREFERENCE=relative` sets `resolution.preference`
//! - `IMPORTER_DEBOUNCE__FILE_MS=500` sets `debounce.file_ms`
//! - `IMPORTER_LOG_LEVEL=debug` sets `log_level`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parsing::ImportStyle;
use crate::project_resolver::ImportPreference;

/// Directory holding the settings file, searched upwards from the current directory
pub const CONFIG_DIR: &str = ".importer";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .importer is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Style for statements created in files without imports to imitate
    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ResolutionConfig {
    /// How new import specifiers are written
    #[serde(default)]
    pub preference: ImportPreference,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DebounceConfig {
    /// Quiet period before a changed file is rescanned
    #[serde(default = "default_file_ms")]
    pub file_ms: u64,

    /// Quiet period before a structurally changed project is rebuilt
    #[serde(default = "default_project_ms")]
    pub project_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StyleConfig {
    #[serde(default = "default_quote")]
    pub quote: char,
    #[serde(default = "default_true")]
    pub semicolon: bool,
    #[serde(default = "default_true")]
    pub brace_padding: bool,
    #[serde(default = "default_true")]
    pub comma_space: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndexingConfig {
    /// File extensions (without dot) registered as importable modules; only code
    /// extensions are scanned for imports
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Patterns to ignore during enumeration
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Honour .gitignore files
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_file_ms() -> u64 {
    1000
}
fn default_project_ms() -> u64 {
    10_000
}
fn default_quote() -> char {
    '\''
}
fn default_true() -> bool {
    true
}
fn default_extensions() -> Vec<String> {
    [
        "ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "css", "scss", "sass", "less",
        "json", "svg", "png", "jpg", "jpeg", "gif", "webp",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        "node_modules/**".to_string(),
        ".git/**".to_string(),
        "dist/**".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            debug: false,
            log_level: default_log_level(),
            resolution: ResolutionConfig::default(),
            debounce: DebounceConfig::default(),
            style: StyleConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            file_ms: default_file_ms(),
            project_ms: default_project_ms(),
        }
    }
}

impl DebounceConfig {
    pub fn file_delay(&self) -> Duration {
        Duration::from_millis(self.file_ms)
    }

    pub fn project_delay(&self) -> Duration {
        Duration::from_millis(self.project_ms)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            quote: default_quote(),
            semicolon: true,
            brace_padding: true,
            comma_space: true,
        }
    }
}

impl StyleConfig {
    pub fn import_style(&self) -> ImportStyle {
        ImportStyle {
            quote: self.quote,
            semicolon: self.semicolon,
            brace_padding: self.brace_padding,
            comma_space: self.comma_space,
            ..ImportStyle::default()
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            respect_gitignore: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    /// Defaults, then the TOML file, then `IMPORTER_` variables.
    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscore stays
            .merge(Env::prefixed("IMPORTER_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the settings file by looking for the .importer directory
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .importer is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# Importer configuration
version = 1

# Global debug mode
debug = false

# Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
log_level = "warn"

[resolution]
# How new import specifiers are written:
#   shortest              fewest path segments, non-relative on ties
#   relative              always ./ or ../
#   non-relative          path alias or base directory, relative as fallback
#   project-relative      non-relative inside the project root, relative outside
#   relative-within-alias relative when both files share the same alias root
preference = "shortest"

[debounce]
# Quiet period before a changed file is rescanned
file_ms = 1000
# Quiet period before a project is rebuilt after structural changes
project_ms = 10000

[style]
# Used for new statements in files that have no imports to imitate
quote = "'"
semicolon = true
brace_padding = true
comma_space = true

[indexing]
# Importable files; only code files are scanned for imports
extensions = [
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts",
    "css", "scss", "sass", "less", "json", "svg", "png", "jpg", "jpeg", "gif", "webp",
]
ignore_patterns = ["node_modules/**", ".git/**", "dist/**"]
respect_gitignore = true
"#;
        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
