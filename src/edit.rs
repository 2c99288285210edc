//! Planning the insertion of a new import
//!
//! Given a document and an import request, compute the single [`TextEdit`] an
//! editor has to apply: either a rewrite of an existing statement that the new
//! import merges into, or a fresh statement after the last import.

use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::indexing::{Project, SourceModuleImport, SourceSymbolImport};
use crate::parsing::{
    ImportKind, ImportParser, ImportStatement, ImportStyle, ImportSymbol, identifier_at,
};
use crate::project_resolver::ImportPreference;
use crate::project_resolver::path::normalize;
use crate::specifier::{is_absolute, shorten};

/// What the user picked from the import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequest {
    /// A module by universal specifier; with an alias it becomes a default import
    Module {
        target: String,
        alias: Option<String>,
    },
    /// A previously seen whole-module import shape
    ModulePattern(SourceModuleImport),
    /// A previously seen symbol import
    SymbolPattern(SourceSymbolImport),
}

impl ImportRequest {
    pub fn target(&self) -> &str {
        match self {
            ImportRequest::Module { target, .. } => target,
            ImportRequest::ModulePattern(pattern) => &pattern.specifier,
            ImportRequest::SymbolPattern(pattern) => &pattern.specifier,
        }
    }

    /// Statement importing from `specifier` in `style`.
    fn statement(&self, specifier: String, style: ImportStyle) -> ImportStatement {
        match self {
            ImportRequest::Module { alias: Some(alias), .. } => {
                ImportStatement::default_import(alias.clone(), specifier, style)
            }
            ImportRequest::Module { alias: None, .. } => {
                ImportStatement::module_only(specifier, style)
            }
            ImportRequest::ModulePattern(pattern) => match (pattern.kind, &pattern.alias) {
                (ImportKind::DefaultAlias, Some(alias)) => {
                    ImportStatement::default_import(alias.clone(), specifier, style)
                }
                (ImportKind::AllAlias, Some(alias)) => {
                    ImportStatement::all_import(alias.clone(), specifier, style)
                }
                (ImportKind::SymbolsOnly, _) => {
                    ImportStatement::symbols_import(Vec::new(), specifier, style)
                }
                _ => ImportStatement::module_only(specifier, style),
            },
            ImportRequest::SymbolPattern(pattern) => ImportStatement::symbols_import(
                vec![ImportSymbol::new(pattern.name.clone(), pattern.alias.clone())],
                specifier,
                style,
            ),
        }
    }
}

/// A single text mutation for the editor collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Byte offset where the text goes
    pub offset: usize,
    /// End of the replaced range; `None` inserts without replacing
    pub replace_end: Option<usize>,
    pub text: String,
    /// Byte offset of the cursor in the document after the edit
    pub cursor: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TextEdit {
    pub fn is_replacement(&self) -> bool {
        self.replace_end.is_some()
    }
}

/// Host editor buffer.
pub trait Editor {
    fn apply(&mut self, edit: &TextEdit) -> IndexResult<()>;

    /// Text of a zero-based line, without its terminator.
    fn line_text(&self, line: usize) -> Option<String>;

    /// Search term for the word at `column` of `line`.
    fn search_term(&self, line: usize, column: usize) -> Option<String> {
        self.line_text(line).and_then(|text| identifier_at(&text, column))
    }
}

/// Plain in-memory buffer, for tests and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    pub text: String,
    pub cursor: usize,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
        }
    }
}

impl Editor for TextBuffer {
    fn apply(&mut self, edit: &TextEdit) -> IndexResult<()> {
        let end = edit.replace_end.unwrap_or(edit.offset);
        let len = self.text.len();
        if edit.offset > end
            || end > len
            || !self.text.is_char_boundary(edit.offset)
            || !self.text.is_char_boundary(end)
        {
            return Err(IndexError::EditOutOfRange {
                offset: edit.offset,
                end,
                len,
            });
        }
        self.text.replace_range(edit.offset..end, &edit.text);
        self.cursor = edit.cursor;
        Ok(())
    }

    fn line_text(&self, line: usize) -> Option<String> {
        self.text
            .lines()
            .nth(line)
            .map(|text| text.trim_end_matches('\r').to_string())
    }
}

/// Byte offset of the `chars`-th character.
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Offset just past the line containing `offset`, and whether a line break was found.
fn line_end(document: &str, offset: usize) -> (usize, bool) {
    match document[offset..].find('\n') {
        Some(newline) => (offset + newline + 1, true),
        None => (document.len(), false),
    }
}

/// Compute the edit that adds `request` to `document`, the content of `file`.
pub fn plan_import(
    project: &Project,
    file: &Path,
    document: &str,
    request: &ImportRequest,
    preference: ImportPreference,
    fallback_style: &ImportStyle,
) -> TextEdit {
    let mut statements = ImportParser::new().parse(document);
    for statement in &mut statements {
        statement.resolved = project
            .resolve(file, &statement.specifier)
            .universal()
            .map(str::to_string);
    }

    // In-project targets are compared by registry key, so `/p/a.ts` matches `/p/a`
    let target = match request.target() {
        path if is_absolute(path) => shorten(&normalize(path)),
        other => other.to_string(),
    };
    let specifier = if is_absolute(&target) || project.index().source_module(&target).is_some() {
        project.best_specifier(file, &target, preference)
    } else {
        target.clone()
    };

    let style = statements
        .last()
        .map_or_else(|| fallback_style.clone(), |last| last.style.clone());
    let mut requested = request.statement(specifier, style);
    requested.resolved = Some(target);

    let mergeable = statements
        .iter()
        .find(|existing| existing.can_merge(&requested));
    if let Some(existing) = mergeable {
        let mut merged = existing.clone();
        let warnings = merged.merge(&requested).unwrap_or_default();
        let rendered = merged.render();
        debug!("merging into '{}' at {}", existing.specifier, existing.start);
        return TextEdit {
            offset: existing.start.offset,
            replace_end: Some(existing.end.offset),
            cursor: existing.start.offset + byte_offset(&rendered.text, rendered.cursor),
            text: rendered.text,
            warnings,
        };
    }

    let rendered = requested.render();
    let newline = requested.style.newline.as_str();
    let (offset, prefix) = match statements.last() {
        Some(last) => match line_end(document, last.end.offset) {
            (offset, true) => (offset, ""),
            (offset, false) => (offset, newline),
        },
        // After a hashbang line, otherwise at the very top
        None if document.starts_with("#!") => match line_end(document, 0) {
            (offset, true) => (offset, ""),
            (offset, false) => (offset, newline),
        },
        None => (0, ""),
    };

    TextEdit {
        offset,
        replace_end: None,
        cursor: offset + prefix.len() + byte_offset(&rendered.text, rendered.cursor),
        text: format!("{prefix}{}{newline}", rendered.text),
        warnings: Vec::new(),
    }
}
