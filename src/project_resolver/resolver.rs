//! Forward resolution and preferred-specifier computation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ResolutionResult;
use super::path::{
    is_within, join, normalize, parent, relative_path, relative_specifier, segment_count,
};
use super::paths::PathAliasResolver;
use super::project_config::ProjectConfig;
use crate::specifier::{is_absolute, is_relative, shorten};

/// Registry lookup used by forward resolution.
pub trait ModuleLookup {
    /// Whether a source module is registered under the shortened key.
    fn contains_module(&self, key: &str) -> bool;
}

impl ModuleLookup for HashSet<String> {
    fn contains_module(&self, key: &str) -> bool {
        self.contains(key)
    }
}

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "specifier", rename_all = "snake_case")]
pub enum Resolution {
    /// In-project file; carries the shortened absolute key
    Source(String),
    /// Package-style module; carries the specifier as written
    External(String),
    /// Relative or absolute path that names no known file
    Unresolved,
}

impl Resolution {
    /// Universal-path specifier of the target, if any.
    pub fn universal(&self) -> Option<&str> {
        match self {
            Resolution::Source(key) | Resolution::External(key) => Some(key),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Resolution::Source(_))
    }
}

/// Policy for choosing between the relative and non-relative form of a new import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportPreference {
    /// Fewest path segments; ties go to the non-relative form
    #[default]
    Shortest,
    Relative,
    /// Alias or base-directory form, relative when neither applies
    NonRelative,
    /// Non-relative unless the target is outside the project root
    ProjectRelative,
    /// Relative when importer and target share their first alias segment
    RelativeWithinAlias,
}

impl std::str::FromStr for ImportPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortest" => Ok(Self::Shortest),
            "relative" => Ok(Self::Relative),
            "non-relative" => Ok(Self::NonRelative),
            "project-relative" => Ok(Self::ProjectRelative),
            "relative-within-alias" => Ok(Self::RelativeWithinAlias),
            other => Err(format!("unknown import preference '{other}'")),
        }
    }
}

/// Resolver for one project configuration.
#[derive(Debug)]
pub struct ModuleResolver {
    root: String,
    base: Option<String>,
    aliases: PathAliasResolver,
    root_dirs: Vec<String>,
}

impl ModuleResolver {
    pub fn new(config: &ProjectConfig) -> ResolutionResult<Self> {
        Ok(Self {
            root: config.root_key(),
            base: config.base_key(),
            aliases: PathAliasResolver::from_config(config)?,
            root_dirs: config.root_dir_keys(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolve `specifier` written in a file located in `importing_dir`.
    ///
    /// Bare specifiers try path aliases, then the base directory, then fall back to
    /// `External`. Relative specifiers try the virtual directory union, then the
    /// importing directory.
    pub fn resolve(
        &self,
        importing_dir: &str,
        specifier: &str,
        lookup: &impl ModuleLookup,
    ) -> Resolution {
        let specifier = specifier.trim();
        if specifier.is_empty() {
            return Resolution::Unresolved;
        }

        let found = |path: &str| {
            let key = shorten(&normalize(path));
            lookup.contains_module(&key).then_some(key)
        };

        if is_relative(specifier) {
            let importing_dir = normalize(importing_dir);
            for candidate in self.virtual_candidates(&importing_dir, specifier) {
                if let Some(key) = found(&candidate) {
                    return Resolution::Source(key);
                }
            }
            return match found(&join(&importing_dir, specifier)) {
                Some(key) => Resolution::Source(key),
                None => Resolution::Unresolved,
            };
        }

        if is_absolute(specifier) {
            return match found(specifier) {
                Some(key) => Resolution::Source(key),
                None => Resolution::Unresolved,
            };
        }

        for candidate in self.aliases.resolve_import(specifier) {
            if let Some(key) = found(&candidate) {
                return Resolution::Source(key);
            }
        }
        if let Some(base) = &self.base {
            if let Some(key) = found(&join(base, specifier)) {
                return Resolution::Source(key);
            }
        }
        Resolution::External(specifier.to_string())
    }

    /// Paths a relative specifier could name inside the virtual directory union.
    fn virtual_candidates(&self, importing_dir: &str, specifier: &str) -> Vec<String> {
        let Some(member) = self.root_dirs.iter().find(|dir| is_within(dir, importing_dir)) else {
            return Vec::new();
        };
        let sub = relative_path(member, importing_dir);
        // Resolved against a fake root so `..` cannot escape the union
        let virtual_path = join(&format!("/{sub}"), specifier);
        let virtual_path = virtual_path.trim_start_matches('/');
        self.root_dirs
            .iter()
            .map(|dir| join(dir, virtual_path))
            .collect()
    }

    /// Relative form through the virtual directory union, if both files take part in it.
    fn virtual_specifier(&self, importing_dir: &str, target: &str) -> Option<String> {
        let from = self.root_dirs.iter().find(|dir| is_within(dir, importing_dir))?;
        let to = self.root_dirs.iter().find(|dir| is_within(dir, target))?;
        if from == to {
            return None;
        }
        let from_virtual = format!("/{}", relative_path(from, importing_dir));
        let to_virtual = format!("/{}", relative_path(to, target));
        Some(relative_specifier(
            &normalize(&from_virtual),
            &normalize(&to_virtual),
        ))
    }

    /// Shortest relative form, including the virtual directory form.
    fn relative_form(&self, importing_dir: &str, target: &str) -> String {
        let plain = relative_specifier(importing_dir, target);
        match self.virtual_specifier(importing_dir, target) {
            Some(virtual_form) if segment_count(&virtual_form) < segment_count(&plain) => {
                virtual_form
            }
            _ => plain,
        }
    }

    /// Shortest alias or base-directory form.
    fn non_relative_form(&self, target: &str) -> Option<String> {
        let mut forms = self.aliases.aliases_for(target);
        if let Some(base) = &self.base {
            if is_within(base, target) && base != target {
                forms.push(relative_path(base, target));
            }
        }
        // min_by_key keeps the first of equal counts, so aliases beat the base form
        forms.into_iter().min_by_key(|form| segment_count(form))
    }

    /// Specifier to write in `importing_file` for the module key `target`.
    pub fn best_specifier(
        &self,
        importing_file: &str,
        target: &str,
        preference: ImportPreference,
    ) -> String {
        let importing_file = normalize(importing_file);
        let target = shorten(&normalize(target));
        let importing_dir = parent(&importing_file);

        let relative = self.relative_form(&importing_dir, &target);
        let Some(non_relative) = self.non_relative_form(&target) else {
            return relative;
        };

        match preference {
            ImportPreference::Relative => relative,
            ImportPreference::NonRelative => non_relative,
            ImportPreference::Shortest => {
                if segment_count(&relative) < segment_count(&non_relative) {
                    relative
                } else {
                    non_relative
                }
            }
            ImportPreference::ProjectRelative => {
                if is_within(&self.root, &target) {
                    non_relative
                } else {
                    relative
                }
            }
            ImportPreference::RelativeWithinAlias => {
                let own = self.non_relative_form(&shorten(&importing_file));
                let first = |form: &str| form.split('/').next().map(str::to_string);
                match own {
                    Some(own) if first(&own) == first(&non_relative) => relative,
                    _ => non_relative,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn alias_wins_over_base_directory() {
        let config = ProjectConfig::new("/p")
            .with_base_url("src")
            .with_alias("*", &["screen/*"]);
        let resolver = ModuleResolver::new(&config).unwrap();
        let modules = registry(&["/p/src/screen/desktop", "/p/src/desktop"]);

        assert_eq!(
            resolver.resolve("/p", "desktop", &modules),
            Resolution::Source("/p/src/screen/desktop".into())
        );

        let without_alias = ProjectConfig::new("/p").with_base_url("src");
        let resolver = ModuleResolver::new(&without_alias).unwrap();
        assert_eq!(
            resolver.resolve("/p", "desktop", &modules),
            Resolution::Source("/p/src/desktop".into())
        );
    }

    #[test]
    fn bare_specifier_falls_back_to_external() {
        let resolver = ModuleResolver::new(&ProjectConfig::new("/p")).unwrap();
        let modules = registry(&[]);
        assert_eq!(
            resolver.resolve("/p/src", "lodash/fp", &modules),
            Resolution::External("lodash/fp".into())
        );
        assert_eq!(resolver.resolve("/p/src", "./missing", &modules), Resolution::Unresolved);
        assert_eq!(resolver.resolve("/p/src", "  ", &modules), Resolution::Unresolved);
    }

    #[test]
    fn relative_and_index_resolution() {
        let resolver = ModuleResolver::new(&ProjectConfig::new("/p")).unwrap();
        let modules = registry(&["/p/src/button", "/p/lib"]);
        assert_eq!(
            resolver.resolve("/p/src", "./button.tsx", &modules),
            Resolution::Source("/p/src/button".into())
        );
        assert_eq!(
            resolver.resolve("/p/src", "../lib/index.js", &modules),
            Resolution::Source("/p/lib".into())
        );
        assert_eq!(
            resolver.resolve("/p/src", "/p/src/button", &modules),
            Resolution::Source("/p/src/button".into())
        );
    }

    #[test]
    fn virtual_directory_union() {
        let config = ProjectConfig::new("/p").with_root_dirs(&["src", "generated"]);
        let resolver = ModuleResolver::new(&config).unwrap();
        let modules = registry(&["/p/generated/views/template"]);
        assert_eq!(
            resolver.resolve("/p/src/views", "./template", &modules),
            Resolution::Source("/p/generated/views/template".into())
        );
        assert_eq!(
            resolver.best_specifier(
                "/p/src/views/page.ts",
                "/p/generated/views/template",
                ImportPreference::Relative
            ),
            "./template"
        );
    }

    #[test]
    fn shortest_prefers_fewer_segments() {
        let config = ProjectConfig::new("/p")
            .with_base_url("src")
            .with_alias("@ui/*", &["components/ui/*"]);
        let resolver = ModuleResolver::new(&config).unwrap();

        // Sibling: relative has one segment
        assert_eq!(
            resolver.best_specifier(
                "/p/src/components/ui/a.ts",
                "/p/src/components/ui/button",
                ImportPreference::Shortest
            ),
            "./button"
        );
        // Distant: alias has two segments, relative has five
        assert_eq!(
            resolver.best_specifier(
                "/p/src/pages/home/index.ts",
                "/p/src/components/ui/button",
                ImportPreference::Shortest
            ),
            "@ui/button"
        );
    }

    #[test]
    fn shortest_tie_prefers_non_relative() {
        let config = ProjectConfig::new("/p").with_base_url(".");
        let resolver = ModuleResolver::new(&config).unwrap();
        // "../lib/x" (3) vs "lib/x" (2)
        assert_eq!(
            resolver.best_specifier("/p/src/a.ts", "/p/lib/x", ImportPreference::Shortest),
            "lib/x"
        );
        // "./x" (1) vs "x" (1): tie
        assert_eq!(
            resolver.best_specifier("/p/a.ts", "/p/x", ImportPreference::Shortest),
            "x"
        );
    }

    #[test]
    fn policies() {
        let config = ProjectConfig::new("/p")
            .with_base_url("src")
            .with_alias("@app/*", &["app/*"])
            .with_alias("@lib/*", &["lib/*"]);
        let resolver = ModuleResolver::new(&config).unwrap();
        let from = "/p/src/app/pages/home.ts";

        assert_eq!(
            resolver.best_specifier(from, "/p/src/app/pages/about", ImportPreference::Relative),
            "./about"
        );
        assert_eq!(
            resolver.best_specifier(from, "/p/src/app/pages/about", ImportPreference::NonRelative),
            "@app/pages/about"
        );
        assert_eq!(
            resolver.best_specifier(
                from,
                "/p/src/app/pages/about",
                ImportPreference::ProjectRelative
            ),
            "@app/pages/about"
        );
        assert_eq!(
            resolver.best_specifier(
                from,
                "/p/src/app/pages/about",
                ImportPreference::RelativeWithinAlias
            ),
            "./about"
        );
        assert_eq!(
            resolver.best_specifier(from, "/p/src/lib/util", ImportPreference::RelativeWithinAlias),
            "@lib/util"
        );
    }

    #[test]
    fn no_non_relative_form_falls_back_to_relative() {
        let resolver = ModuleResolver::new(&ProjectConfig::new("/p")).unwrap();
        assert_eq!(
            resolver.best_specifier("/p/src/a.ts", "/p/lib/x.ts", ImportPreference::NonRelative),
            "../lib/x"
        );
    }

    #[test]
    fn preference_parses_from_config_strings() {
        assert_eq!(
            "relative-within-alias".parse::<ImportPreference>(),
            Ok(ImportPreference::RelativeWithinAlias)
        );
        assert!("sideways".parse::<ImportPreference>().is_err());
    }
}
