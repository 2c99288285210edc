//! Import statement model
//!
//! An [`ImportStatement`] remembers every formatting choice the developer made
//! (quotes, semicolon, brace padding, comma spacing, per-symbol indentation and
//! comments) so that [`ImportStatement::as_text`] reproduces the original text
//! exactly when nothing was edited. Fields added programmatically fall back to the
//! statement's [`ImportStyle`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::trivia::Trivia;
use crate::types::SourceLocation;

/// Shape of an import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import './polyfill'`
    ModuleOnly,
    /// `import React from 'react'`, optionally with a symbol list
    DefaultAlias,
    /// `import * as path from 'path'`
    AllAlias,
    /// `import { a, b as c } from './x'`
    SymbolsOnly,
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleOnly => write!(f, "module"),
            Self::DefaultAlias => write!(f, "default"),
            Self::AllAlias => write!(f, "all"),
            Self::SymbolsOnly => write!(f, "symbols"),
        }
    }
}

/// Formatting preferences used for anything without recorded trivia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStyle {
    pub quote: char,
    pub semicolon: bool,
    /// `{ a }` rather than `{a}`
    pub brace_padding: bool,
    /// `a, b` rather than `a,b`
    pub comma_space: bool,
    /// Indentation of symbols laid out one per line
    pub symbol_indent: Option<String>,
    pub newline: String,
}

impl Default for ImportStyle {
    fn default() -> Self {
        Self {
            quote: '\'',
            semicolon: true,
            brace_padding: true,
            comma_space: true,
            symbol_indent: None,
            newline: "\n".to_string(),
        }
    }
}

/// One entry of a `{ ... }` symbol list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSymbol {
    pub name: String,
    pub alias: Option<String>,
    /// Inline `type` modifier (`{ type Props }`)
    pub is_type: bool,
    /// Trivia before the symbol (or before its `type` modifier)
    pub trivia: Option<Trivia>,
    pub(crate) name_trivia: Option<Trivia>,
    pub(crate) as_trivia: Option<Trivia>,
    pub(crate) alias_trivia: Option<Trivia>,
    /// Trivia before the comma that follows this symbol
    pub(crate) comma_trivia: Option<Trivia>,
}

impl ImportSymbol {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
            is_type: false,
            trivia: None,
            name_trivia: None,
            as_trivia: None,
            alias_trivia: None,
            comma_trivia: None,
        }
    }

    /// Name the symbol is bound to in the importing module.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Copy of the symbol without any recorded formatting.
    pub fn detached(&self) -> Self {
        Self {
            is_type: self.is_type,
            ..Self::new(self.name.clone(), self.alias.clone())
        }
    }
}

/// Trivia recorded in front of each fixed token of the statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatementLayout {
    pub type_keyword: Option<Trivia>,
    pub default_alias: Option<Trivia>,
    pub default_comma: Option<Trivia>,
    pub star: Option<Trivia>,
    pub star_as: Option<Trivia>,
    pub all_alias: Option<Trivia>,
    pub open_brace: Option<Trivia>,
    pub close_brace: Option<Trivia>,
    pub has_braces: bool,
    pub trailing_comma: bool,
    pub from_keyword: Option<Trivia>,
    pub specifier: Option<Trivia>,
    pub semicolon: Option<Trivia>,
}

/// Text produced by serialization plus where the cursor should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImport {
    pub text: String,
    /// Character offset within `text`
    pub cursor: usize,
}

/// A parsed (or programmatically built) import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: ImportKind,
    pub is_type_only: bool,
    pub default_alias: Option<String>,
    pub all_alias: Option<String>,
    pub symbols: Vec<ImportSymbol>,
    /// Specifier exactly as written, without quotes
    pub specifier: String,
    /// Universal specifier, set once resolution succeeds
    pub resolved: Option<String>,
    pub style: ImportStyle,
    pub start: SourceLocation,
    pub end: SourceLocation,
    pub is_understood: bool,
    pub(crate) layout: StatementLayout,
}

impl ImportStatement {
    pub(crate) fn empty(start: SourceLocation) -> Self {
        Self {
            kind: ImportKind::ModuleOnly,
            is_type_only: false,
            default_alias: None,
            all_alias: None,
            symbols: Vec::new(),
            specifier: String::new(),
            resolved: None,
            style: ImportStyle::default(),
            start,
            end: start,
            is_understood: false,
            layout: StatementLayout::default(),
        }
    }

    /// `import '<specifier>'`
    pub fn module_only(specifier: impl Into<String>, style: ImportStyle) -> Self {
        let mut statement = Self::empty(SourceLocation::default());
        statement.specifier = specifier.into();
        statement.style = style;
        statement.is_understood = true;
        statement
    }

    /// `import <alias> from '<specifier>'`
    pub fn default_import(
        alias: impl Into<String>,
        specifier: impl Into<String>,
        style: ImportStyle,
    ) -> Self {
        let mut statement = Self::module_only(specifier, style);
        statement.default_alias = Some(alias.into());
        statement.refresh_kind();
        statement
    }

    /// `import * as <alias> from '<specifier>'`
    pub fn all_import(
        alias: impl Into<String>,
        specifier: impl Into<String>,
        style: ImportStyle,
    ) -> Self {
        let mut statement = Self::module_only(specifier, style);
        statement.all_alias = Some(alias.into());
        statement.refresh_kind();
        statement
    }

    /// `import { ... } from '<specifier>'`; an empty list renders as `{}`.
    pub fn symbols_import(
        symbols: Vec<ImportSymbol>,
        specifier: impl Into<String>,
        style: ImportStyle,
    ) -> Self {
        let mut statement = Self::module_only(specifier, style);
        statement.layout.has_braces = true;
        statement.symbols = symbols.iter().map(ImportSymbol::detached).collect();
        statement.refresh_kind();
        statement
    }

    pub fn has_symbol_list(&self) -> bool {
        self.layout.has_braces || !self.symbols.is_empty()
    }

    pub fn symbol(&self, name: &str) -> Option<&ImportSymbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    /// Byte range of the statement in its source.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Key used to find the module this statement imports from.
    pub fn target(&self) -> &str {
        self.resolved.as_deref().unwrap_or(&self.specifier)
    }

    pub(crate) fn refresh_kind(&mut self) {
        self.kind = if self.all_alias.is_some() {
            ImportKind::AllAlias
        } else if self.default_alias.is_some() {
            ImportKind::DefaultAlias
        } else if self.has_symbol_list() {
            ImportKind::SymbolsOnly
        } else {
            ImportKind::ModuleOnly
        };
    }

    pub fn set_default_alias(&mut self, alias: Option<String>) {
        self.default_alias = alias;
        self.refresh_kind();
    }

    /// Rename (or un-alias) a symbol. Returns false when the symbol is not imported.
    pub fn set_symbol_alias(&mut self, name: &str, alias: Option<String>) -> bool {
        match self.symbols.iter_mut().find(|symbol| symbol.name == name) {
            Some(symbol) => {
                symbol.alias = alias.filter(|alias| alias != name);
                true
            }
            None => false,
        }
    }

    /// Whether `other` can be folded into this statement.
    ///
    /// Both must target the same module; namespace (`* as`) imports never merge, and
    /// two different default aliases cannot share one statement.
    pub fn can_merge(&self, other: &ImportStatement) -> bool {
        let same_target = match (&self.resolved, &other.resolved) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.specifier == other.specifier,
            _ => false,
        };
        let conflicting_defaults = matches!(
            (&self.default_alias, &other.default_alias),
            (Some(a), Some(b)) if a != b
        );
        same_target
            && self.kind != ImportKind::AllAlias
            && other.kind != ImportKind::AllAlias
            && self.is_type_only == other.is_type_only
            && !conflicting_defaults
    }

    /// Fold `other` into this statement. Returns `None` when the statements cannot be
    /// merged, otherwise the warnings produced while appending symbols.
    pub fn merge(&mut self, other: &ImportStatement) -> Option<Vec<String>> {
        if !self.can_merge(other) {
            return None;
        }
        if self.default_alias.is_none() && other.default_alias.is_some() {
            self.default_alias = other.default_alias.clone();
        }
        let warnings = if other.has_symbol_list() {
            self.append(&other.symbols)
        } else {
            Vec::new()
        };
        self.refresh_kind();
        Some(warnings)
    }

    /// Append symbols to the list, skipping names that are already imported.
    ///
    /// A name imported under a different alias yields a warning and is not added.
    /// New entries copy the line layout of the last existing symbol; the closing
    /// brace keeps its indentation.
    pub fn append(&mut self, symbols: &[ImportSymbol]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut additions: Vec<ImportSymbol> = Vec::new();

        for symbol in symbols {
            let existing = self
                .symbols
                .iter()
                .chain(additions.iter())
                .find(|candidate| candidate.name == symbol.name);
            if let Some(existing) = existing {
                if existing.alias != symbol.alias {
                    let message = format!(
                        "'{}' is already imported as '{}'; not adding '{}'",
                        existing.name,
                        existing.local_name(),
                        symbol.alias.as_deref().unwrap_or(&symbol.name)
                    );
                    warn!("{message}");
                    warnings.push(message);
                }
                continue;
            }
            additions.push(symbol.detached());
        }

        if additions.is_empty() {
            return warnings;
        }

        if self.symbols.is_empty() {
            // `{}` or no list at all: the style decides everything
            self.layout.has_braces = true;
            self.layout.close_brace = None;
            self.symbols.extend(additions);
            self.refresh_kind();
            return warnings;
        }

        let template = self.symbols.last().and_then(|last| last.trivia.clone());
        let line_mode = match &template {
            Some(trivia) => trivia.has_line_break(),
            None => self.style.symbol_indent.is_some(),
        };

        let mut carried = String::new();
        if line_mode {
            if let Some(close) = self.layout.close_brace.take() {
                // Text trailing the last symbol's line follows it; the line break and
                // indentation before `}` stay with the brace
                if close.has_line_break() {
                    carried = close.content;
                    self.layout.close_brace = Some(Trivia {
                        content: String::new(),
                        closing: close.closing,
                    });
                } else {
                    self.layout.close_brace = Some(close);
                }
            }
        }

        let newline = template
            .as_ref()
            .and_then(|trivia| trivia.newline())
            .unwrap_or(self.style.newline.as_str())
            .to_string();
        let indent = template
            .as_ref()
            .and_then(|trivia| trivia.indent())
            .or(self.style.symbol_indent.as_deref())
            .unwrap_or("")
            .to_string();

        for (position, mut symbol) in additions.into_iter().enumerate() {
            let mut leading = if line_mode {
                Trivia::line(&newline, &indent)
            } else {
                Trivia::inline(if self.style.comma_space { " " } else { "" })
            };
            if position == 0 && !carried.is_empty() {
                leading.content = std::mem::take(&mut carried);
            }
            symbol.trivia = Some(leading);
            self.symbols.push(symbol);
        }

        self.refresh_kind();
        warnings
    }

    /// Serialized statement text.
    pub fn as_text(&self) -> String {
        self.render().text
    }

    /// Offset in [`as_text`](Self::as_text) where the cursor should be placed after insertion.
    pub fn cursor_anchor(&self) -> usize {
        self.render().cursor
    }

    /// Serialize the statement and compute its cursor anchor.
    pub fn render(&self) -> RenderedImport {
        let layout = &self.layout;
        let style = &self.style;
        let mut out = String::from("import");
        let mut cursor = None;

        if self.is_type_only {
            push_trivia(&mut out, &layout.type_keyword, " ");
            out.push_str("type");
        }

        let has_bindings =
            self.default_alias.is_some() || self.all_alias.is_some() || self.has_symbol_list();

        if let Some(alias) = &self.default_alias {
            push_trivia(&mut out, &layout.default_alias, " ");
            out.push_str(alias);
            cursor = Some(out.len());
        }

        if let Some(alias) = &self.all_alias {
            if self.default_alias.is_some() {
                push_trivia(&mut out, &layout.default_comma, "");
                out.push(',');
            }
            push_trivia(&mut out, &layout.star, " ");
            out.push('*');
            push_trivia(&mut out, &layout.star_as, " ");
            out.push_str("as");
            push_trivia(&mut out, &layout.all_alias, " ");
            out.push_str(alias);
            cursor = Some(out.len());
        } else if self.has_symbol_list() {
            if self.default_alias.is_some() {
                push_trivia(&mut out, &layout.default_comma, "");
                out.push(',');
            }
            push_trivia(&mut out, &layout.open_brace, " ");
            out.push('{');
            cursor = Some(out.len());

            let count = self.symbols.len();
            for (index, symbol) in self.symbols.iter().enumerate() {
                let fallback = self.default_symbol_trivia(index);
                push_trivia(&mut out, &symbol.trivia, &fallback);
                if symbol.is_type {
                    out.push_str("type");
                    push_trivia(&mut out, &symbol.name_trivia, " ");
                }
                out.push_str(&symbol.name);
                if let Some(alias) = &symbol.alias {
                    push_trivia(&mut out, &symbol.as_trivia, " ");
                    out.push_str("as");
                    push_trivia(&mut out, &symbol.alias_trivia, " ");
                    out.push_str(alias);
                }
                cursor = Some(out.len());
                if index + 1 < count || layout.trailing_comma {
                    push_trivia(&mut out, &symbol.comma_trivia, "");
                    out.push(',');
                }
            }

            let close_fallback = if count == 0 {
                ""
            } else if style.symbol_indent.is_some() {
                style.newline.as_str()
            } else if style.brace_padding {
                " "
            } else {
                ""
            };
            push_trivia(&mut out, &layout.close_brace, close_fallback);
            out.push('}');
        }

        if has_bindings {
            push_trivia(&mut out, &layout.from_keyword, " ");
            out.push_str("from");
        }

        push_trivia(&mut out, &layout.specifier, " ");
        out.push(style.quote);
        out.push_str(&self.specifier);
        if cursor.is_none() {
            cursor = Some(out.len());
        }
        out.push(style.quote);

        if style.semicolon {
            push_trivia(&mut out, &layout.semicolon, "");
            out.push(';');
        }

        let cursor = cursor.unwrap_or(out.len());
        RenderedImport {
            cursor: out[..cursor].chars().count(),
            text: out,
        }
    }

    fn default_symbol_trivia(&self, index: usize) -> String {
        let style = &self.style;
        match &style.symbol_indent {
            Some(indent) => format!("{}{}", style.newline, indent),
            None if index == 0 && style.brace_padding => " ".to_string(),
            None if index > 0 && style.comma_space => " ".to_string(),
            None => String::new(),
        }
    }
}

fn push_trivia(out: &mut String, trivia: &Option<Trivia>, fallback: &str) {
    match trivia {
        Some(trivia) => {
            out.push_str(&trivia.content);
            if let Some(closing) = &trivia.closing {
                out.push_str(closing);
            }
        }
        None => out.push_str(fallback),
    }
}
