//! Module specifier normalization
//!
//! Every textual specifier (`./button.tsx`, `../lib/index.js`, `@app/core`, `lodash`)
//! is reduced to a canonical *shortened* form that serves as the lookup key for the
//! project index. The mapping is pure: it never touches the file system.
//!
//! Rules:
//! - hidden code extensions (`.ts`, `.tsx`, `.d.ts`, `.js`, `.jsx`) are stripped
//! - module-variant extensions (`.mjs`, `.cjs`, `.mts`, `.cts`, ...) are code but stay visible
//! - a trailing `/index` is stripped when the extension was hidden (or absent), and
//!   both rules repeat until the string stops changing
//! - every other extension (styles, images, templates) is kept verbatim
//! - no extension at all means the specifier is already shortened code

use serde::{Deserialize, Serialize};

/// Code extensions that are conventionally omitted from import specifiers.
pub const HIDDEN_EXTENSIONS: &[&str] = &[".d.ts", ".ts", ".tsx", ".js", ".jsx"];

/// Code extensions that must always be written out.
pub const VISIBLE_CODE_EXTENSIONS: &[&str] = &[".d.mts", ".d.cts", ".mjs", ".cjs", ".mts", ".cts"];

/// Extension ranking used when two files answer to the same shortened key.
/// Later entries win.
const QUALITY_ORDER: &[&str] = &[
    ".js", ".jsx", ".mjs", ".cjs", ".d.mts", ".d.cts", ".d.ts", ".tsx", ".mts", ".cts", ".ts",
];

/// Canonical view of a specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specifier {
    /// Hidden extension and `/index` removed; the registry key
    pub shortened: String,
    /// Raw extension including the leading dot (`.d.ts`, `.css`), if any
    pub extension: Option<String>,
    /// Whether the specifier names code (or has no extension at all)
    pub is_code: bool,
    /// Whether a trailing `/index` segment was removed
    pub has_index: bool,
}

impl Specifier {
    /// Normalize a specifier string.
    pub fn parse(specifier: &str) -> Self {
        let extension = extension_of(specifier);

        let hidden = extension
            .as_deref()
            .is_none_or(|ext| HIDDEN_EXTENSIONS.contains(&ext));
        if hidden {
            // No extension means already shortened code; a bare `/index` still
            // collapses onto its directory
            let (shortened, has_index) = reduce(specifier);
            return Self {
                shortened: shortened.to_string(),
                extension,
                is_code: true,
                has_index,
            };
        }

        let ext = extension.as_deref().unwrap_or_default();
        let is_code = VISIBLE_CODE_EXTENSIONS.contains(&ext);
        let has_index = specifier[..specifier.len() - ext.len()].ends_with("/index");
        Self {
            shortened: specifier.to_string(),
            extension,
            is_code,
            has_index,
        }
    }

    /// Rebuild the absolute form: shortened path with `/index` and extension restored.
    pub fn absolute(&self) -> String {
        match &self.extension {
            Some(ext) if HIDDEN_EXTENSIONS.contains(&ext.as_str()) => {
                let mut out = if self.has_index {
                    format!("{}/index", self.shortened.trim_end_matches('/'))
                } else {
                    self.shortened.clone()
                };
                out.push_str(ext);
                out
            }
            None if self.has_index => format!("{}/index", self.shortened.trim_end_matches('/')),
            _ => self.shortened.clone(),
        }
    }

    /// Rank of the file behind this specifier; higher wins a shared key.
    pub fn symbol_quality(&self) -> u8 {
        symbol_quality(self.extension.as_deref())
    }
}

/// Shortened form of `specifier`. Idempotent.
pub fn shorten(specifier: &str) -> String {
    Specifier::parse(specifier).shortened
}

/// Quality rank for an extension (with leading dot). Non-code extensions rank 0.
pub fn symbol_quality(extension: Option<&str>) -> u8 {
    let Some(ext) = extension else {
        return 0;
    };
    QUALITY_ORDER
        .iter()
        .position(|candidate| *candidate == ext)
        .map(|index| index as u8 + 1)
        .unwrap_or(0)
}

/// Extension of the last path segment, recognizing compound declaration extensions.
pub fn extension_of(specifier: &str) -> Option<String> {
    let file_name = specifier.rsplit('/').next().unwrap_or(specifier);
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return None;
    }

    for compound in [".d.ts", ".d.mts", ".d.cts"] {
        if file_name.len() > compound.len() && file_name.ends_with(compound) {
            return Some(compound.to_string());
        }
    }

    // Leading dot alone marks a dotfile, not an extension
    let dot = file_name.rfind('.')?;
    if dot == 0 || dot == file_name.len() - 1 {
        return None;
    }
    Some(file_name[dot..].to_string())
}

/// Whether the specifier is written relative to the importing file.
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Whether the specifier is a rooted file-system path.
pub fn is_absolute(specifier: &str) -> bool {
    specifier.starts_with('/') || has_drive_prefix(specifier)
}

fn has_drive_prefix(specifier: &str) -> bool {
    let bytes = specifier.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Strip hidden extensions and `/index` segments until neither is left.
fn reduce(specifier: &str) -> (&str, bool) {
    let mut current = specifier;
    let mut has_index = false;
    loop {
        let before = current.len();
        let hidden = extension_of(current).filter(|ext| HIDDEN_EXTENSIONS.contains(&ext.as_str()));
        if let Some(ext) = hidden {
            current = &current[..current.len() - ext.len()];
        }
        let (stem, stripped) = strip_index(current);
        current = stem;
        has_index |= stripped;
        if current.len() == before {
            return (current, has_index);
        }
    }
}

fn strip_index(stem: &str) -> (&str, bool) {
    match stem.strip_suffix("/index") {
        Some("") => ("/", true),
        Some(dir) => (dir, true),
        None => (stem, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hidden_extension() {
        let spec = Specifier::parse("./components/button.tsx");
        assert_eq!(spec.shortened, "./components/button");
        assert_eq!(spec.extension.as_deref(), Some(".tsx"));
        assert!(spec.is_code);
        assert!(!spec.has_index);
    }

    #[test]
    fn strips_index_and_extension() {
        let spec = Specifier::parse("/project/src/screen/index.ts");
        assert_eq!(spec.shortened, "/project/src/screen");
        assert!(spec.has_index);
        assert_eq!(spec.absolute(), "/project/src/screen/index.ts");
    }

    #[test]
    fn keeps_module_variant_extensions() {
        let spec = Specifier::parse("./worker.mjs");
        assert_eq!(spec.shortened, "./worker.mjs");
        assert!(spec.is_code);

        let index = Specifier::parse("./lib/index.cjs");
        assert_eq!(index.shortened, "./lib/index.cjs");
        assert!(index.has_index);
    }

    #[test]
    fn keeps_non_code_extensions() {
        let spec = Specifier::parse("./styles/main.scss");
        assert_eq!(spec.shortened, "./styles/main.scss");
        assert!(!spec.is_code);
        assert_eq!(spec.symbol_quality(), 0);
    }

    #[test]
    fn no_extension_is_shortened_code() {
        let spec = Specifier::parse("lodash");
        assert_eq!(spec.shortened, "lodash");
        assert!(spec.is_code);
        assert!(spec.extension.is_none());

        assert_eq!(shorten("./lib/index"), "./lib");
        assert_eq!(shorten("../.."), "../..");
        assert_eq!(shorten("./.eslintrc"), "./.eslintrc");
    }

    #[test]
    fn declaration_files_are_compound() {
        let spec = Specifier::parse("./types/api.d.ts");
        assert_eq!(spec.shortened, "./types/api");
        assert_eq!(spec.extension.as_deref(), Some(".d.ts"));
    }

    #[test]
    fn shorten_is_idempotent() {
        let inputs = [
            "./a/index.ts",
            "./a/index",
            "./a/b.d.ts",
            "./a/b.css",
            "../index.js",
            "./worker.mjs",
            "@scope/pkg/index.tsx",
            "/abs/path/file.jsx",
            "./dir.with.dots/file",
            ".",
            "..",
            "index.ts",
            "./a/index/index.ts",
            "./a/index/index",
            "./b.ts.ts",
            "./b.css.ts",
            "./x/index.ts/index.js",
            "/index",
        ];
        for input in inputs {
            let once = shorten(input);
            assert_eq!(shorten(&once), once, "not idempotent for {input}");
        }
    }

    #[test]
    fn nested_index_and_doubled_extensions_collapse() {
        let spec = Specifier::parse("./a/index/index.ts");
        assert_eq!(spec.shortened, "./a");
        assert!(spec.has_index);
        assert_eq!(spec.extension.as_deref(), Some(".ts"));

        assert_eq!(shorten("./b.ts.ts"), "./b");
        assert_eq!(shorten("./b.d.ts.js"), "./b");
        assert_eq!(shorten("./b.css.ts"), "./b.css");
        assert_eq!(shorten("/index"), "/");
    }

    #[test]
    fn quality_prefers_declarations_over_scripts() {
        assert!(symbol_quality(Some(".d.ts")) > symbol_quality(Some(".js")));
        assert!(symbol_quality(Some(".ts")) > symbol_quality(Some(".d.ts")));
        assert_eq!(symbol_quality(Some(".png")), 0);
        assert_eq!(symbol_quality(None), 0);
    }

    #[test]
    fn relative_and_absolute_markers() {
        assert!(is_relative("./a"));
        assert!(is_relative("../a"));
        assert!(is_relative(".."));
        assert!(!is_relative(".hidden"));
        assert!(!is_relative("react"));
        assert!(is_absolute("/usr/lib"));
        assert!(is_absolute("C:/work/app"));
        assert!(!is_absolute("react"));
    }
}
