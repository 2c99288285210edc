//! Trivia-preserving import statement parsing and serialization

pub mod line;
pub mod parser;
pub mod scanner;
pub mod statement;
pub mod trivia;

pub use line::identifier_at;
pub use parser::{ImportParser, parse_import, parse_imports, parse_statement};
pub use scanner::{Checkpoint, Scanner, Token, TokenKind};
pub use statement::{ImportKind, ImportStatement, ImportStyle, ImportSymbol, RenderedImport};
pub use trivia::Trivia;
