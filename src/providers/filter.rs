//! Include/exclude filtering shared by the file system implementations

use ignore::Match;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::Path;

use crate::error::{IndexError, IndexResult};

/// Decides whether a file belongs to a project.
///
/// Include patterns are whitelist globs (everything else is dropped when at least
/// one is given); exclude and ignore patterns are negated globs. Only files with
/// one of the configured extensions pass.
#[derive(Debug, Clone)]
pub struct FileFilter {
    overrides: Override,
    extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(
        root: &Path,
        include: &[String],
        exclude: &[String],
        extensions: &[String],
    ) -> IndexResult<Self> {
        let walk_error = |e: ignore::Error| IndexError::FileWalk {
            root: root.to_path_buf(),
            reason: e.to_string(),
        };

        let mut builder = OverrideBuilder::new(root);
        for pattern in include {
            builder.add(&as_glob(pattern)).map_err(walk_error)?;
        }
        for pattern in exclude {
            let glob = as_glob(pattern);
            builder.add(&format!("!{glob}")).map_err(walk_error)?;
            // Lets the walker prune the directory itself
            if let Some(dir) = glob.strip_suffix("/**") {
                builder.add(&format!("!{dir}")).map_err(walk_error)?;
            }
        }

        Ok(Self {
            overrides: builder.build().map_err(walk_error)?,
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
        })
    }

    /// Overrides for `ignore::WalkBuilder`.
    pub fn overrides(&self) -> Override {
        self.overrides.clone()
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext));
        extension_ok && !matches!(self.overrides.matched(path, false), Match::Ignore(_))
    }
}

/// A bare directory name (`src`) covers everything below it.
fn as_glob(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
    let is_glob = pattern.contains(['*', '?', '[']);
    let has_extension = pattern
        .rsplit('/')
        .next()
        .is_some_and(|name| name.contains('.'));
    if is_glob || has_extension {
        pattern.to_string()
    } else {
        format!("{pattern}/**")
    }
}
