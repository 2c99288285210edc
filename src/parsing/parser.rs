//! Import statement parser
//!
//! A small state machine over the token stream, entered on each `import` keyword.
//! Recognized shapes, each optionally with a leading `type` modifier:
//!
//! - `import 'x'`
//! - `import A from 'x'`
//! - `import A, { b, c as d } from 'x'`
//! - `import A, * as ns from 'x'`
//! - `import { b, c as d } from 'x'`
//! - `import * as ns from 'x'`
//!
//! Anything else (`import('x')`, `import.meta`, `import x = require('x')`, a missing
//! `from`, an unterminated list) yields a statement with `is_understood == false` and
//! leaves the scanner just past the `import` keyword.

use tracing::trace;

use super::scanner::{Scanner, Token, TokenKind};
use super::statement::{ImportStatement, ImportSymbol};
use super::trivia::Trivia;
use crate::types::SourceLocation;

/// Parses every import statement of a source text.
#[derive(Debug, Default)]
pub struct ImportParser {
    /// Statements skipped during the last parse
    skipped: usize,
}

impl ImportParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse all understood import statements, in source order.
    pub fn parse(&mut self, code: &str) -> Vec<ImportStatement> {
        self.skipped = 0;
        let mut scanner = Scanner::new(code);
        let mut statements = Vec::new();
        let mut previous = TokenKind::EndOfFile;

        loop {
            let kind = scanner.next();
            match kind {
                TokenKind::EndOfFile => break,
                // `foo.import` is a property, not a statement
                TokenKind::Import if previous != TokenKind::Dot => {
                    let statement = parse_statement(&mut scanner);
                    if statement.is_understood {
                        statements.push(statement);
                        previous = TokenKind::Semicolon;
                        continue;
                    }
                    self.skipped += 1;
                    trace!("skipped unrecognized import at {}", statement.start);
                }
                _ => {}
            }
            previous = kind;
        }

        statements
    }

    /// Number of `import` keywords that did not form a recognized statement.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Parse all understood import statements of `code`.
pub fn parse_imports(code: &str) -> Vec<ImportStatement> {
    ImportParser::new().parse(code)
}

/// Parse exactly one statement; `code` must start with (optional trivia and) `import`.
pub fn parse_import(code: &str) -> Option<ImportStatement> {
    let mut scanner = Scanner::new(code);
    if scanner.next() != TokenKind::Import {
        return None;
    }
    Some(parse_statement(&mut scanner)).filter(|statement| statement.is_understood)
}

/// Parse the statement whose `import` keyword is the scanner's current token.
///
/// On failure the scanner is rewound to just past that keyword.
pub fn parse_statement(scanner: &mut Scanner<'_>) -> ImportStatement {
    let keyword = scanner.token();
    let after_keyword = scanner.checkpoint();
    let mut statement = ImportStatement::empty(location_of(&keyword));

    let mut parser = StatementParser {
        scanner,
        statement: &mut statement,
    };
    match parser.parse_body() {
        Some(end) => {
            statement.end = end;
            statement.is_understood = true;
            statement.refresh_kind();
            detect_style(&mut statement);
        }
        None => {
            scanner.restore(after_keyword);
            statement.is_understood = false;
            statement.end = location_after(&keyword);
        }
    }
    statement
}

struct StatementParser<'s, 'a> {
    scanner: &'s mut Scanner<'a>,
    statement: &'s mut ImportStatement,
}

impl<'s, 'a> StatementParser<'s, 'a> {
    fn advance(&mut self) -> (TokenKind, Token<'a>) {
        let kind = self.scanner.next();
        (kind, self.scanner.token())
    }

    /// Parse everything after `import`; returns the end location on success.
    fn parse_body(&mut self) -> Option<SourceLocation> {
        let (mut kind, mut token) = self.advance();

        if kind == TokenKind::Type && self.is_type_modifier() {
            self.statement.is_type_only = true;
            self.statement.layout.type_keyword = Some(Trivia::parse(token.trivia));
            (kind, token) = self.advance();
        }

        match kind {
            TokenKind::StringLiteral => return Some(self.finish_specifier(token)),
            TokenKind::OpenBrace => self.parse_symbol_list(token)?,
            TokenKind::Asterisk => self.parse_all_alias(token)?,
            k if k.is_identifier_like() => {
                self.statement.default_alias = Some(token.text.to_string());
                self.statement.layout.default_alias = Some(Trivia::parse(token.trivia));
                let (next, next_token) = self.advance();
                match next {
                    TokenKind::From => {
                        self.scanner.go_back();
                    }
                    TokenKind::Comma => {
                        self.statement.layout.default_comma =
                            Some(Trivia::parse(next_token.trivia));
                        let (after, after_token) = self.advance();
                        match after {
                            TokenKind::OpenBrace => self.parse_symbol_list(after_token)?,
                            TokenKind::Asterisk => self.parse_all_alias(after_token)?,
                            _ => return None,
                        }
                    }
                    _ => return None,
                }
            }
            _ => return None,
        }

        let (kind, token) = self.advance();
        if kind != TokenKind::From {
            return None;
        }
        self.statement.layout.from_keyword = Some(Trivia::parse(token.trivia));

        let (kind, token) = self.advance();
        if kind != TokenKind::StringLiteral {
            return None;
        }
        Some(self.finish_specifier(token))
    }

    /// Decide whether the current `type` token modifies the statement or is itself
    /// a default binding named `type`. Leaves the scanner on the `type` token.
    fn is_type_modifier(&mut self) -> bool {
        let at_type = self.scanner.checkpoint();
        let (next, _) = self.advance();
        let modifier = match next {
            TokenKind::OpenBrace | TokenKind::Asterisk => true,
            // `import type from 'x'` binds `type`; `import type from from 'x'` binds `from`
            TokenKind::From => self.scanner.next() != TokenKind::StringLiteral,
            // `import type, { a } from 'x'`
            TokenKind::Comma => false,
            k => k.is_identifier_like(),
        };
        self.scanner.restore(at_type);
        modifier
    }

    fn parse_all_alias(&mut self, star: Token<'a>) -> Option<()> {
        self.statement.layout.star = Some(Trivia::parse(star.trivia));
        let (kind, token) = self.advance();
        if kind != TokenKind::As {
            return None;
        }
        self.statement.layout.star_as = Some(Trivia::parse(token.trivia));
        let (kind, token) = self.advance();
        if !kind.is_identifier_like() {
            return None;
        }
        self.statement.layout.all_alias = Some(Trivia::parse(token.trivia));
        self.statement.all_alias = Some(token.text.to_string());
        Some(())
    }

    fn parse_symbol_list(&mut self, open: Token<'a>) -> Option<()> {
        let layout = &mut self.statement.layout;
        layout.open_brace = Some(Trivia::parse(open.trivia));
        layout.has_braces = true;

        let mut after_comma = false;
        loop {
            let (kind, token) = self.advance();
            match kind {
                TokenKind::CloseBrace => {
                    self.statement.layout.close_brace = Some(Trivia::parse(token.trivia));
                    self.statement.layout.trailing_comma = after_comma;
                    return Some(());
                }
                k if k.is_identifier_like() => {
                    let symbol = self.parse_symbol(token)?;
                    self.statement.symbols.push(symbol);
                }
                _ => return None,
            }

            let (kind, token) = self.advance();
            match kind {
                TokenKind::Comma => {
                    if let Some(last) = self.statement.symbols.last_mut() {
                        last.comma_trivia = Some(Trivia::parse(token.trivia));
                    }
                    after_comma = true;
                }
                TokenKind::CloseBrace => {
                    self.statement.layout.close_brace = Some(Trivia::parse(token.trivia));
                    self.statement.layout.trailing_comma = false;
                    return Some(());
                }
                _ => return None,
            }
        }
    }

    fn parse_symbol(&mut self, first: Token<'a>) -> Option<ImportSymbol> {
        let mut symbol = ImportSymbol::new(first.text, None);
        symbol.trivia = Some(Trivia::parse(first.trivia));

        if first.kind == TokenKind::Type {
            // `{ type Foo }` but not `{ type }`, `{ type, ... }` or `{ type as t }`
            let (kind, token) = self.advance();
            if kind.is_identifier_like() && kind != TokenKind::As {
                symbol.is_type = true;
                symbol.name = token.text.to_string();
                symbol.name_trivia = Some(Trivia::parse(token.trivia));
            } else {
                self.scanner.go_back();
            }
        }

        let (kind, token) = self.advance();
        if kind == TokenKind::As {
            symbol.as_trivia = Some(Trivia::parse(token.trivia));
            let (kind, alias) = self.advance();
            if !kind.is_identifier_like() {
                return None;
            }
            symbol.alias_trivia = Some(Trivia::parse(alias.trivia));
            symbol.alias = Some(alias.text.to_string());
        } else {
            self.scanner.go_back();
        }
        Some(symbol)
    }

    fn finish_specifier(&mut self, literal: Token<'a>) -> SourceLocation {
        self.statement.layout.specifier = Some(Trivia::parse(literal.trivia));
        self.statement.specifier = literal.string_value().to_string();
        self.statement.style.quote = literal.quote().unwrap_or('\'');

        let (kind, token) = self.advance();
        // A semicolon on a later line is an empty statement of its own
        if kind == TokenKind::Semicolon && !token.trivia.contains('\n') {
            self.statement.style.semicolon = true;
            self.statement.layout.semicolon = Some(Trivia::parse(token.trivia));
            location_after(&token)
        } else {
            self.scanner.go_back();
            self.statement.style.semicolon = false;
            location_after(&literal)
        }
    }
}

/// Derive the statement's style preferences from what was parsed.
fn detect_style(statement: &mut ImportStatement) {
    let style = &mut statement.style;
    match statement.symbols.first().and_then(|first| first.trivia.as_ref()) {
        Some(first) => {
            style.brace_padding = !first.is_empty();
            style.symbol_indent = first.indent().map(str::to_string);
            if let Some(newline) = first.newline() {
                style.newline = newline.to_string();
            }
        }
        None => {
            if let Some(close) = &statement.layout.close_brace {
                style.brace_padding = !close.is_empty();
            }
        }
    }
    if let Some(second) = statement.symbols.get(1).and_then(|s| s.trivia.as_ref()) {
        style.comma_space = !second.is_empty();
    }
}

fn location_of(token: &Token<'_>) -> SourceLocation {
    SourceLocation::new(token.pos, token.line, token.column)
}

fn location_after(token: &Token<'_>) -> SourceLocation {
    // Tokens that end a statement never span lines
    SourceLocation::new(
        token.end(),
        token.line,
        token.column + token.text.chars().count() as u32,
    )
}
