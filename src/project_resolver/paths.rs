//! Path alias matching in both directions.
//!
//! Forward: `@app/*` with target `src/app/*` turns `@app/button` into `<base>/src/app/button`.
//! Reverse: the absolute module key `<base>/src/app/button` becomes `@app/button`.

use super::path::join;
use super::project_config::ProjectConfig;
use super::{ResolutionError, ResolutionResult};
use crate::specifier::shorten;

/// Compiled path rule for pattern matching
#[derive(Debug)]
pub struct PathRule {
    /// Original pattern (e.g., "@components/*")
    pub pattern: String,
    /// Absolute target templates (e.g., ["/p/src/components/*"])
    pub targets: Vec<String>,
    /// Compiled regex for pattern matching
    regex: regex::Regex,
}

impl PathRule {
    /// Compile `pattern`; `targets` are resolved against `base`.
    pub fn new(pattern: &str, targets: &[String], base: &str) -> ResolutionResult<Self> {
        if pattern.matches('*').count() > 1 {
            return Err(ResolutionError::invalid_pattern(
                pattern,
                "more than one '*' wildcard",
            ));
        }
        if targets.is_empty() {
            return Err(ResolutionError::invalid_pattern(pattern, "no targets"));
        }
        // "@components/*" becomes "^@components/(.*)$"
        let regex_pattern = format!("^{}$", regex::escape(pattern).replace("\\*", "(.*)"));
        let regex = regex::Regex::new(&regex_pattern)
            .map_err(|e| ResolutionError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            targets: targets.iter().map(|target| join(base, target)).collect(),
            regex,
        })
    }

    pub fn has_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }

    /// Length of the literal text before the wildcard
    fn prefix_len(&self) -> usize {
        self.pattern.find('*').unwrap_or(self.pattern.len())
    }

    /// Candidate paths for `specifier`, one per target, in target order.
    pub fn try_resolve(&self, specifier: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(specifier)?;
        let captured = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        Some(
            self.targets
                .iter()
                .map(|target| target.replacen('*', captured, 1))
                .collect(),
        )
    }

    /// Alias specifiers that would resolve to the module key `target`.
    pub fn reverse(&self, target: &str) -> Vec<String> {
        let mut aliases = Vec::new();
        for template in &self.targets {
            let alias = match template.split_once('*') {
                Some((prefix, suffix)) => {
                    let suffix = shorten(suffix);
                    let Some(rest) = target.strip_prefix(prefix) else {
                        continue;
                    };
                    let Some(captured) = rest.strip_suffix(suffix.as_str()) else {
                        continue;
                    };
                    if captured.is_empty() {
                        continue;
                    }
                    self.pattern.replacen('*', captured, 1)
                }
                None if shorten(template) == target => self.pattern.clone(),
                None => continue,
            };
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        aliases
    }
}

/// Path alias resolver built from a project's alias table
#[derive(Debug, Default)]
pub struct PathAliasResolver {
    /// Compiled path rules in priority order
    pub rules: Vec<PathRule>,
}

impl PathAliasResolver {
    pub fn from_config(config: &ProjectConfig) -> ResolutionResult<Self> {
        let base = config.alias_base_key();
        let mut rules = config
            .paths
            .iter()
            .map(|alias| PathRule::new(&alias.pattern, &alias.targets, &base))
            .collect::<ResolutionResult<Vec<_>>>()?;

        // Exact patterns first, then longest literal prefix; ties keep declaration order
        rules.sort_by_key(|rule| (rule.has_wildcard(), std::cmp::Reverse(rule.prefix_len())));
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Candidate paths for `specifier` across all matching rules, most specific first.
    pub fn resolve_import(&self, specifier: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        for rule in &self.rules {
            if let Some(resolved) = rule.try_resolve(specifier) {
                candidates.extend(resolved);
            }
        }
        candidates
    }

    /// Every alias form of the module key `target`.
    pub fn aliases_for(&self, target: &str) -> Vec<String> {
        let mut aliases = Vec::new();
        for rule in &self.rules {
            for alias in rule.reverse(target) {
                if !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
        }
        aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathAliasResolver {
        let config = ProjectConfig::new("/p")
            .with_base_url("src")
            .with_alias("@app/*", &["app/*", "legacy/app/*"])
            .with_alias("@app/ui/*", &["ui/*"])
            .with_alias("config", &["config/index.ts"]);
        PathAliasResolver::from_config(&config).unwrap()
    }

    #[test]
    fn forward_substitutes_every_target() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_import("@app/button"),
            vec!["/p/src/app/button", "/p/src/legacy/app/button"]
        );
        assert_eq!(resolver.resolve_import("config"), vec!["/p/src/config/index.ts"]);
        assert!(resolver.resolve_import("react").is_empty());
    }

    #[test]
    fn more_specific_rule_comes_first() {
        let resolver = resolver();
        let candidates = resolver.resolve_import("@app/ui/button");
        assert_eq!(candidates[0], "/p/src/ui/button");
        assert_eq!(candidates[1], "/p/src/app/ui/button");
    }

    #[test]
    fn reverse_matches_templates() {
        let resolver = resolver();
        assert_eq!(resolver.aliases_for("/p/src/app/button"), vec!["@app/button"]);
        assert_eq!(resolver.aliases_for("/p/src/config"), vec!["config"]);
        assert!(resolver.aliases_for("/p/other/x").is_empty());
    }

    #[test]
    fn rejects_double_wildcard() {
        let config = ProjectConfig::new("/p").with_alias("@a/*/*", &["a/*"]);
        let err = PathAliasResolver::from_config(&config).unwrap_err();
        assert_eq!(err.status_code(), "RESOLUTION_INVALID_PATTERN");
    }
}
