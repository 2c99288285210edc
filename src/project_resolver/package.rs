//! Package-manifest entry points and candidate file lookup
//!
//! Used when a caller needs the actual file(s) behind a package specifier, not just
//! a yes/no answer. Lookup walks `node_modules` directories from the importing
//! directory upwards, and for each package (and its `@types` counterpart) collects
//! entries from `exports`, `typesVersions`, `types`/`typings` and `main` before
//! probing the file system directly. Several files may come back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::memo::ResolutionMemo;
use super::path::{ancestors, join};
use super::provider::{FileSystem, ManifestReader};
use crate::specifier::{HIDDEN_EXTENSIONS, VISIBLE_CODE_EXTENSIONS, extension_of};

/// Extensions tried when a candidate path has none, in probing order.
const PROBE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".d.ts", ".mts", ".d.mts", ".cts", ".d.cts", ".js", ".jsx", ".mjs", ".cjs",
];

/// The parts of `package.json` that matter for locating entry points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub typings: Option<String>,
    /// Version range → (pattern → targets)
    #[serde(default, rename = "typesVersions")]
    pub types_versions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Raw `exports` field; strings, arrays and nested condition objects
    #[serde(default)]
    pub exports: Option<Value>,
}

impl PackageManifest {
    /// Package-relative targets for `subpath` (`None` = the package root), best first.
    pub fn entry_points(&self, subpath: Option<&str>) -> Vec<String> {
        let mut targets = Vec::new();

        if let Some(exports) = &self.exports {
            let key = match subpath {
                Some(sub) => format!("./{sub}"),
                None => ".".to_string(),
            };
            targets.extend(match_exports(&flatten_exports(exports), &key));
        }

        let declared = [&self.types, &self.typings, &self.main];
        let mapped_path = match subpath {
            Some(sub) => sub.to_string(),
            None => declared
                .iter()
                .find_map(|entry| entry.as_deref())
                .unwrap_or("index")
                .trim_start_matches("./")
                .to_string(),
        };
        for mapping in self.types_versions.values() {
            for (pattern, templates) in mapping {
                if let Some(captured) = wildcard_match(pattern, &mapped_path) {
                    targets.extend(templates.iter().map(|t| t.replacen('*', captured, 1)));
                }
            }
        }

        if subpath.is_none() {
            targets.extend(declared.iter().filter_map(|entry| (*entry).clone()));
        }

        let mut unique = Vec::with_capacity(targets.len());
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        unique
    }
}

/// Flatten an `exports` value into subpath → targets.
///
/// Condition objects (`import`, `require`, `types`, `default`, ...) are walked
/// recursively and every string target is kept, in declaration order.
pub fn flatten_exports(exports: &Value) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    match exports {
        Value::Object(entries) if entries.keys().any(|key| key.starts_with('.')) => {
            for (subpath, value) in entries {
                let mut targets = Vec::new();
                flatten_conditions(value, &mut targets);
                map.insert(subpath.clone(), targets);
            }
        }
        other => {
            let mut targets = Vec::new();
            flatten_conditions(other, &mut targets);
            map.insert(".".to_string(), targets);
        }
    }
    map
}

fn flatten_conditions(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(target) => {
            if !out.contains(target) {
                out.push(target.clone());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| flatten_conditions(item, out)),
        Value::Object(conditions) => conditions
            .values()
            .for_each(|nested| flatten_conditions(nested, out)),
        _ => {}
    }
}

fn match_exports(exports: &BTreeMap<String, Vec<String>>, key: &str) -> Vec<String> {
    if let Some(targets) = exports.get(key) {
        return targets.clone();
    }
    let mut targets = Vec::new();
    for (pattern, templates) in exports {
        if !pattern.contains('*') {
            continue;
        }
        if let Some(captured) = wildcard_match(pattern, key) {
            targets.extend(templates.iter().map(|t| t.replacen('*', captured, 1)));
        }
    }
    targets
}

/// Text matched by the `*` of `pattern`, or `""` for an exact match.
fn wildcard_match<'a>(pattern: &str, input: &'a str) -> Option<&'a str> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => input
            .strip_prefix(prefix)?
            .strip_suffix(suffix)
            .filter(|captured| !captured.is_empty()),
        None => (pattern == input).then_some(""),
    }
}

/// Split a bare specifier into package name and subpath.
pub fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    if specifier.is_empty() {
        return None;
    }
    let scoped = specifier.starts_with('@');
    let mut slashes = specifier.match_indices('/').map(|(index, _)| index);
    let end = if scoped { slashes.nth(1) } else { slashes.next() };
    match end {
        Some(end) => {
            let subpath = &specifier[end + 1..];
            Some((&specifier[..end], (!subpath.is_empty()).then_some(subpath)))
        }
        // A lone `@scope` names no package
        None if scoped && !specifier.contains('/') => None,
        None => Some((specifier, None)),
    }
}

/// Name of the `@types` package for `package` (`@scope/pkg` → `scope__pkg`).
fn types_name(package: &str) -> String {
    match package.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => package.to_string(),
    }
}

/// Finds files behind package specifiers.
pub struct PackageLocator {
    fs: Arc<dyn FileSystem>,
    manifests: Arc<dyn ManifestReader>,
    cache: ResolutionMemo<PathBuf, PackageManifest>,
}

impl PackageLocator {
    pub fn new(fs: Arc<dyn FileSystem>, manifests: Arc<dyn ManifestReader>) -> Self {
        Self {
            fs,
            manifests,
            cache: ResolutionMemo::new(),
        }
    }

    /// Forget cached manifests (after installs or project rebuilds).
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Existing files `specifier` could refer to, nearest `node_modules` first.
    pub fn locate(&self, importing_dir: &str, specifier: &str) -> Vec<PathBuf> {
        let Some((package, subpath)) = split_package(specifier) else {
            return Vec::new();
        };

        for dir in ancestors(importing_dir) {
            let modules_dir = join(&dir, "node_modules");
            let mut found = Vec::new();
            self.collect_package(&join(&modules_dir, package), subpath, &mut found);
            if !package.starts_with("@types/") {
                let typings = format!("@types/{}", types_name(package));
                self.collect_package(&join(&modules_dir, &typings), subpath, &mut found);
            }
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Existing files behind an in-project key (extension and `/index` probing).
    pub fn probe_source(&self, key: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        self.probe(key, &mut found);
        found
    }

    fn manifest(&self, package_dir: &str) -> Option<Arc<PackageManifest>> {
        let path = PathBuf::from(join(package_dir, "package.json"));
        if let Some(manifest) = self.cache.get(&path) {
            return Some(manifest);
        }
        if !self.fs.exists(&path) {
            return None;
        }
        match self.manifests.read_manifest(&path) {
            Ok(manifest) => Some(self.cache.insert(path, manifest)),
            Err(e) => {
                // Only this package branch is abandoned
                debug!("skipping manifest: {e}");
                None
            }
        }
    }

    fn collect_package(&self, package_dir: &str, subpath: Option<&str>, found: &mut Vec<PathBuf>) {
        if let Some(manifest) = self.manifest(package_dir) {
            for target in manifest.entry_points(subpath) {
                self.probe(&join(package_dir, &target), found);
            }
        }
        match subpath {
            Some(sub) => self.probe(&join(package_dir, sub), found),
            None => self.probe(package_dir, found),
        }
    }

    fn probe(&self, path: &str, found: &mut Vec<PathBuf>) {
        let mut candidates = Vec::new();
        let stem = match extension_of(path) {
            Some(ext) => {
                candidates.push(path.to_string());
                // `dist/index.js` may ship as `dist/index.d.ts`
                if HIDDEN_EXTENSIONS.contains(&ext.as_str())
                    || VISIBLE_CODE_EXTENSIONS.contains(&ext.as_str())
                {
                    Some(&path[..path.len() - ext.len()])
                } else {
                    None
                }
            }
            None => Some(path),
        };
        if let Some(stem) = stem {
            for ext in PROBE_EXTENSIONS {
                candidates.push(format!("{stem}{ext}"));
            }
            for ext in PROBE_EXTENSIONS {
                candidates.push(format!("{stem}/index{ext}"));
            }
        }

        for candidate in candidates {
            let candidate = PathBuf::from(candidate);
            if !found.contains(&candidate) && self.fs.exists(&candidate) {
                found.push(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_package_names() {
        assert_eq!(split_package("react"), Some(("react", None)));
        assert_eq!(split_package("lodash/fp"), Some(("lodash", Some("fp"))));
        assert_eq!(split_package("@scope/pkg"), Some(("@scope/pkg", None)));
        assert_eq!(split_package("@scope/pkg/a/b"), Some(("@scope/pkg", Some("a/b"))));
        assert_eq!(split_package(""), None);
        assert_eq!(split_package("@scope"), None);
    }

    #[test]
    fn types_package_name() {
        assert_eq!(types_name("@scope/pkg"), "scope__pkg");
        assert_eq!(types_name("react"), "react");
    }

    #[test]
    fn flattens_nested_conditions() {
        let exports = json!({
            ".": {
                "import": { "types": "./dist/index.d.mts", "default": "./dist/index.mjs" },
                "require": "./dist/index.cjs"
            },
            "./features/*": ["./dist/features/*.js", null],
            "./package.json": "./package.json"
        });
        let flat = flatten_exports(&exports);
        assert_eq!(
            flat["."],
            vec!["./dist/index.d.mts", "./dist/index.mjs", "./dist/index.cjs"]
        );
        assert_eq!(flat["./features/*"], vec!["./dist/features/*.js"]);
    }

    #[test]
    fn sugar_exports_map_to_root() {
        assert_eq!(flatten_exports(&json!("./index.js"))["."], vec!["./index.js"]);
        let conditions = json!({ "types": "./a.d.ts", "default": "./a.js" });
        assert_eq!(flatten_exports(&conditions)["."], vec!["./a.d.ts", "./a.js"]);
    }

    #[test]
    fn entry_points_in_priority_order() {
        let manifest: PackageManifest = serde_json::from_value(json!({
            "name": "pkg",
            "main": "./lib/index.js",
            "types": "./lib/index.d.ts",
            "typesVersions": { ">=4.0": { "*": ["ts4/*"] } },
            "exports": { ".": "./dist/index.js", "./extra/*": "./dist/extra/*.js" }
        }))
        .unwrap();

        assert_eq!(
            manifest.entry_points(None),
            vec![
                "./dist/index.js",
                "ts4/lib/index.d.ts",
                "./lib/index.d.ts",
                "./lib/index.js"
            ]
        );
        assert_eq!(
            manifest.entry_points(Some("extra/thing")),
            vec!["./dist/extra/thing.js", "ts4/extra/thing"]
        );
    }
}
