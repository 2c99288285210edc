//! Structured trivia
//!
//! Whitespace and comments between two tokens, split once at the final line break
//! into the part that trails the previous line and the part that indents the next
//! token. Symbol-list merging works on these halves instead of re-scanning raw text.

use std::fmt;

/// Whitespace/comment text preceding a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// Text before the final line break (the whole trivia when there is none)
    pub content: String,
    /// Final line break plus the indentation that follows it
    pub closing: Option<String>,
}

impl Trivia {
    /// Split raw trivia at its last line break.
    pub fn parse(raw: &str) -> Self {
        match raw.rfind('\n') {
            Some(newline) => {
                // Keep a `\r\n` pair together in the closing half
                let split = if newline > 0 && raw.as_bytes()[newline - 1] == b'\r' {
                    newline - 1
                } else {
                    newline
                };
                Self {
                    content: raw[..split].to_string(),
                    closing: Some(raw[split..].to_string()),
                }
            }
            None => Self {
                content: raw.to_string(),
                closing: None,
            },
        }
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
            closing: None,
        }
    }

    /// Trivia consisting of a line break followed by `indent`.
    pub fn line(newline: &str, indent: &str) -> Self {
        Self {
            content: String::new(),
            closing: Some(format!("{newline}{indent}")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.closing.is_none()
    }

    pub fn has_line_break(&self) -> bool {
        self.closing.is_some()
    }

    /// Indentation after the final line break.
    pub fn indent(&self) -> Option<&str> {
        self.closing
            .as_deref()
            .map(|closing| closing.trim_start_matches(['\r', '\n']))
    }

    /// The line break sequence in use (`\n` or `\r\n`).
    pub fn newline(&self) -> Option<&str> {
        self.closing.as_deref().map(|closing| {
            if closing.starts_with("\r\n") {
                "\r\n"
            } else {
                "\n"
            }
        })
    }

    /// Same-line trivia only: everything before the first line break.
    pub fn same_line(&self) -> &str {
        let end = self.content.find('\n').unwrap_or(self.content.len());
        self.content[..end].trim_end_matches('\r')
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)?;
        if let Some(closing) = &self.closing {
            f.write_str(closing)?;
        }
        Ok(())
    }
}
