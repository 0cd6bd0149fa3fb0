//! Position-based scanning primitives.
//!
//! Positions are byte offsets into the line. Every primitive only advances
//! over whole characters, so returned positions are always char boundaries.

use crate::error::{ParseError, ParseErrorKind, ParseResult};

/// A source line together with its 1-indexed line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text without its terminator.
    pub text: &'a str,
    /// 1-indexed line number.
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Creates a line.
    #[must_use]
    pub const fn new(text: &'a str, number: usize) -> Self {
        Self { text, number }
    }

    /// Creates an error of `kind` at byte offset `pos` of this line.
    #[must_use]
    pub fn error(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.text, self.number, pos)
    }

    /// Returns the character at `pos`, if any.
    #[must_use]
    pub fn peek(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|rest| rest.chars().next())
    }

    /// Returns true if `pos` is at or past the end of the line.
    #[must_use]
    pub const fn at_end(&self, pos: usize) -> bool {
        pos >= self.text.len()
    }
}

/// Consumes the maximal run of characters accepted by `accept`.
///
/// Returns the consumed text and the position after it. The text is empty
/// if the character at `pos` is not accepted.
#[must_use]
pub fn read(text: &str, pos: usize, accept: impl Fn(char) -> bool) -> (&str, usize) {
    let Some(rest) = text.get(pos..) else {
        return ("", pos);
    };
    let len = rest
        .char_indices()
        .find(|&(_, c)| !accept(c))
        .map_or(rest.len(), |(i, _)| i);
    (&rest[..len], pos + len)
}

/// Skips whitespace starting at `pos`.
#[must_use]
pub fn skip_spaces(text: &str, pos: usize) -> usize {
    read(text, pos, char::is_whitespace).1
}

/// Characters that may appear in an argument token.
#[must_use]
pub fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && c != ',' && c != '/'
}

/// Reads an argument token: everything up to whitespace, `,` or `/`.
#[must_use]
pub fn read_token(text: &str, pos: usize) -> (&str, usize) {
    read(text, pos, is_token_char)
}

/// A comment found at a `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comment {
    /// `// ...` up to the end of the line.
    Line,
    /// `/* ...`, closed on the same line or not.
    Block {
        /// Whether the last `/*` on the line is followed by `*/`.
        closed: bool,
    },
}

/// Validates the comment starting at `pos` and classifies it.
///
/// # Errors
///
/// Returns `CommentFormat` unless the line continues with `//` or `/*`.
pub fn skip_comment(line: &Line<'_>, pos: usize) -> ParseResult<Comment> {
    let rest = line.text.get(pos..).unwrap_or("");

    if rest.starts_with("//") {
        Ok(Comment::Line)
    } else if let Some(body) = rest.strip_prefix("/*") {
        let closed = match (body.rfind("*/"), body.rfind("/*")) {
            (Some(close), Some(open)) => close > open,
            (close, _) => close.is_some(),
        };
        Ok(Comment::Block { closed })
    } else {
        Err(line.error(pos, ParseErrorKind::CommentFormat))
    }
}

/// Multi-line comment state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentState {
    /// Lines are parsed as code.
    #[default]
    Code,
    /// Inside `/* ... */`; lines are only scanned for the closer.
    Block,
}

impl CommentState {
    /// Returns true while a block comment is open.
    #[must_use]
    pub const fn in_block(self) -> bool {
        matches!(self, Self::Block)
    }

    /// Records a comment that ended the code part of a line.
    pub fn enter(&mut self, comment: Comment) {
        if comment == (Comment::Block { closed: false }) {
            *self = Self::Block;
        }
    }

    /// Scans a line inside a block comment for `*/`.
    ///
    /// Anything after the closer is discarded with the rest of the line.
    /// Returns true if the comment was closed.
    pub fn scan_for_close(&mut self, text: &str, pos: usize) -> bool {
        let closed = text.get(pos..).is_some_and(|rest| rest.contains("*/"));
        if closed {
            *self = Self::Code;
        }
        closed
    }
}
