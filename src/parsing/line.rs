//! Identifier extraction for a single editor line.
//!
//! Used to pre-fill an import search with the word under the cursor. If the line is
//! itself an import statement, the specifier is a better search term than any binding.

use super::parser::parse_import;
use super::scanner::{Scanner, TokenKind};

/// Text worth searching for at `column` (in characters) of `line`.
pub fn identifier_at(line: &str, column: usize) -> Option<String> {
    if let Some(statement) = parse_import(line) {
        return Some(statement.specifier);
    }

    let mut scanner = Scanner::new(line);
    loop {
        let kind = scanner.next();
        if kind == TokenKind::EndOfFile {
            break;
        }
        let token = scanner.token();
        let start = token.column as usize;
        if start > column {
            break;
        }
        if !kind.is_identifier_like() {
            continue;
        }
        let end = start + token.text.chars().count();
        // Cursor inside the word or directly after it
        if column <= end {
            return Some(token.text.to_string());
        }
    }
    None
}
