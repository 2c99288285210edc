//! Lexical scanner for JavaScript/TypeScript source
//!
//! Produces one token at a time together with the trivia (whitespace and comments)
//! that preceded it, so callers can rebuild the original text byte for byte.
//! The scanner never fails: anything it cannot classify becomes [`TokenKind::Unknown`].
//!
//! Lookahead is supported by [`Scanner::go_back`], which rewinds exactly one token,
//! and by [`Scanner::checkpoint`]/[`Scanner::restore`] for longer rewinds.

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Import,
    Export,
    From,
    As,
    Type,
    Identifier,
    StringLiteral,
    TemplateLiteral,
    Number,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Dot,
    Asterisk,
    Equals,
    Punctuation,
    Unknown,
    EndOfFile,
}

impl TokenKind {
    /// Contextual keywords are valid binding names (`import { type } from ...`).
    pub fn is_identifier_like(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Type
                | TokenKind::Import
                | TokenKind::Export
        )
    }
}

/// A scanned token borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Whitespace and comments since the previous token
    pub trivia: &'a str,
    /// Byte offset of the first character of `text`
    pub pos: usize,
    /// Zero-based line of `pos`
    pub line: u32,
    /// Zero-based column (in characters) of `pos`
    pub column: u32,
}

impl<'a> Token<'a> {
    fn start_of_file() -> Self {
        Self {
            kind: TokenKind::Unknown,
            text: "",
            trivia: "",
            pos: 0,
            line: 0,
            column: 0,
        }
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.pos + self.text.len()
    }

    /// Contents of a string literal without its quotes.
    pub fn string_value(&self) -> &'a str {
        let text = self.text;
        if text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            ""
        }
    }

    /// Quote character of a string literal.
    pub fn quote(&self) -> Option<char> {
        self.text.chars().next().filter(|c| matches!(c, '\'' | '"' | '`'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    pos: usize,
    line: u32,
    column: u32,
}

/// Saved scanner position for multi-token rewinds.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint<'a> {
    cursor: Cursor,
    token: Token<'a>,
}

/// Incremental tokenizer over a single source text.
pub struct Scanner<'a> {
    source: &'a str,
    cursor: Cursor,
    current: Token<'a>,
    /// State to restore on `go_back`: the token before `current` and the cursor before it
    previous: Option<(Cursor, Token<'a>)>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Self {
            source,
            cursor: Cursor {
                pos: 0,
                line: 0,
                column: 0,
            },
            current: Token::start_of_file(),
            previous: None,
        };
        scanner.reset(source);
        scanner
    }

    /// Start over on a new text.
    pub fn reset(&mut self, source: &'a str) {
        self.source = source;
        self.cursor = Cursor {
            pos: 0,
            line: 0,
            column: 0,
        };
        self.current = Token::start_of_file();
        self.previous = None;
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The most recently scanned token.
    pub fn token(&self) -> Token<'a> {
        self.current
    }

    /// Advance to the next token and return its kind.
    pub fn next(&mut self) -> TokenKind {
        let before = self.cursor;
        let token = self.scan_token();
        self.previous = Some((before, self.current));
        self.current = token;
        token.kind
    }

    /// Rewind exactly one token. A second call without an intervening `next` does nothing.
    pub fn go_back(&mut self) {
        if let Some((cursor, token)) = self.previous.take() {
            self.cursor = cursor;
            self.current = token;
        }
    }

    pub fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint {
            cursor: self.cursor,
            token: self.current,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.cursor = checkpoint.cursor;
        self.current = checkpoint.token;
        self.previous = None;
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.cursor.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.cursor.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.cursor.pos += c.len_utf8();
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 0;
        } else {
            self.cursor.column += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }

    fn skip_trivia(&mut self) {
        // Hashbang line only counts at the very start of the file
        if self.cursor.pos == 0 && self.source.starts_with("#!") {
            self.bump_while(|c| c != '\n');
        }

        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    self.bump_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => break,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token<'a> {
        let trivia_start = self.cursor.pos;
        self.skip_trivia();
        let start = self.cursor;
        let trivia = &self.source[trivia_start..start.pos];

        let kind = match self.bump() {
            None => TokenKind::EndOfFile,
            Some(c) if is_identifier_start(c) => {
                self.bump_while(is_identifier_part);
                keyword_kind(&self.source[start.pos..self.cursor.pos])
            }
            Some(c) if c.is_ascii_digit() => {
                self.bump_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
                TokenKind::Number
            }
            Some(quote @ ('\'' | '"')) => self.scan_string(quote),
            Some('`') => self.scan_template(),
            Some('{') => TokenKind::OpenBrace,
            Some('}') => TokenKind::CloseBrace,
            Some('(') => TokenKind::OpenParen,
            Some(')') => TokenKind::CloseParen,
            Some(',') => TokenKind::Comma,
            Some(';') => TokenKind::Semicolon,
            Some('.') => TokenKind::Dot,
            Some('*') => TokenKind::Asterisk,
            Some('=') => TokenKind::Equals,
            Some(c) if c.is_ascii_punctuation() => TokenKind::Punctuation,
            Some(_) => TokenKind::Unknown,
        };

        Token {
            kind,
            text: &self.source[start.pos..self.cursor.pos],
            trivia,
            pos: start.pos,
            line: start.line,
            column: start.column,
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        loop {
            match self.peek_char() {
                // Unterminated at end of line: give up on the literal
                None | Some('\n') => return TokenKind::Unknown,
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) => {
                    self.bump();
                    if c == quote {
                        return TokenKind::StringLiteral;
                    }
                }
            }
        }
    }

    fn scan_template(&mut self) -> TokenKind {
        let mut depth = 0usize;
        loop {
            match self.bump() {
                None => return TokenKind::Unknown,
                Some('\\') => {
                    self.bump();
                }
                Some('$') if depth == 0 && self.peek_char() == Some('{') => {
                    self.bump();
                    depth = 1;
                }
                Some('{') if depth > 0 => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some('`') if depth == 0 => return TokenKind::TemplateLiteral,
                Some(_) => {}
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

fn keyword_kind(text: &str) -> TokenKind {
    match text {
        "import" => TokenKind::Import,
        "export" => TokenKind::Export,
        "from" => TokenKind::From,
        "as" => TokenKind::As,
        "type" => TokenKind::Type,
        _ => TokenKind::Identifier,
    }
}
