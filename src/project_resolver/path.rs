//! String path helpers.
//!
//! Module keys and specifiers are compared as `/`-separated strings so that the
//! same logic works for paths read from disk, from config files and from import
//! statements. Nothing here touches the file system.

use std::path::Path;

/// Lossy conversion to a `/`-separated string.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Split off a root prefix (`/` or a drive like `C:/`).
fn split_root(path: &str) -> (&str, &str) {
    if let Some(rest) = path.strip_prefix('/') {
        return ("/", rest);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
    {
        return (&path[..3], &path[3..]);
    }
    ("", path)
}

/// Collapse `.` and `..` segments and duplicate separators.
///
/// `..` above a root is dropped; on a relative path it is kept.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let (root, rest) = split_root(&path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !root.is_empty() => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if root.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        format!("{root}{joined}")
    }
}

pub fn is_rooted(path: &str) -> bool {
    !split_root(path).0.is_empty()
}

/// Join `path` onto `base` unless it is rooted, then normalize.
pub fn join(base: &str, path: &str) -> String {
    if is_rooted(path) || base.is_empty() {
        normalize(path)
    } else {
        normalize(&format!("{base}/{path}"))
    }
}

/// Directory part of `path`.
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    let (root, rest) = split_root(&normalized);
    match rest.rfind('/') {
        Some(index) => format!("{root}{}", &rest[..index]),
        None if !root.is_empty() => root.to_string(),
        None => ".".to_string(),
    }
}

/// Whether `path` equals `dir` or lies below it.
pub fn is_within(dir: &str, path: &str) -> bool {
    let dir = normalize(dir);
    let path = normalize(path);
    if dir == path {
        return true;
    }
    let prefix = if dir.ends_with('/') {
        dir
    } else {
        format!("{dir}/")
    };
    path.starts_with(&prefix)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Relative path from directory `from` to `to`, without a leading `./`.
///
/// Both inputs are expected to be normalized and share a root.
pub fn relative_path(from: &str, to: &str) -> String {
    let (from_root, from_rest) = split_root(from);
    let (to_root, to_rest) = split_root(to);
    if from_root != to_root {
        return to.to_string();
    }
    let from_parts = segments(from_rest);
    let to_parts = segments(to_rest);
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

/// Relative import specifier from directory `from` to `to` (`./x` or `../x`).
pub fn relative_specifier(from: &str, to: &str) -> String {
    let relative = relative_path(from, to);
    if relative.is_empty() {
        ".".to_string()
    } else if relative == ".." || relative.starts_with("../") {
        relative
    } else {
        format!("./{relative}")
    }
}

/// Number of meaningful segments; `.` does not count.
pub fn segment_count(specifier: &str) -> usize {
    specifier
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .count()
}

/// Directories from `dir` up to the root, nearest first.
pub fn ancestors(dir: &str) -> Vec<String> {
    let mut current = normalize(dir);
    let mut result = vec![current.clone()];
    loop {
        let next = parent(&current);
        if next == current || next == "." {
            break;
        }
        result.push(next.clone());
        current = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize("/a/./b/../c//d"), "/a/c/d");
        assert_eq!(normalize("a/../../b"), "../b");
        assert_eq!(normalize("/../a"), "/a");
        assert_eq!(normalize("./"), ".");
        assert_eq!(normalize("C:\\work\\src\\..\\lib"), "C:/work/lib");
    }

    #[test]
    fn join_and_parent() {
        assert_eq!(join("/p/src", "./button"), "/p/src/button");
        assert_eq!(join("/p/src", "../lib/a"), "/p/lib/a");
        assert_eq!(join("/p/src", "/abs/x"), "/abs/x");
        assert_eq!(parent("/p/src/a.ts"), "/p/src");
        assert_eq!(parent("/a"), "/");
        assert_eq!(parent("a"), ".");
    }

    #[test]
    fn within() {
        assert!(is_within("/p", "/p/src/a"));
        assert!(is_within("/p", "/p"));
        assert!(!is_within("/p", "/pp/a"));
        assert!(is_within("/", "/p"));
    }

    #[test]
    fn relative_forms() {
        assert_eq!(relative_specifier("/p/src", "/p/src/button"), "./button");
        assert_eq!(relative_specifier("/p/src/a", "/p/lib/x"), "../../lib/x");
        assert_eq!(relative_specifier("/p/src", "/p/src"), ".");
        assert_eq!(relative_specifier("/p/src/a", "/p/src"), "..");
        assert_eq!(relative_path("/p", "/p/src/x"), "src/x");
    }

    #[test]
    fn counts_segments() {
        assert_eq!(segment_count("./button"), 1);
        assert_eq!(segment_count("../lib/x"), 3);
        assert_eq!(segment_count("@app/ui/button"), 3);
    }

    #[test]
    fn ancestor_chain() {
        assert_eq!(ancestors("/p/src/a"), vec!["/p/src/a", "/p/src", "/p", "/"]);
    }
}
