//! Structured parse errors and the caret-style error reporter.
//!
//! Every reader and the line loop fail with a [`ParseError`] that carries the
//! 1-indexed line number, the 0-indexed character column and a copy of the
//! offending line, so a report can be rendered without going back to the
//! source:
//!
//! ```text
//! Error line 3, position 9: Only registers 0-255 supported.
//!     let R1, R300
//!             ^
//! ```

use thiserror::Error;

use crate::descriptor::Width;

/// Classification of parse errors. Each one is fatal to the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Label token is empty or not made of digits.
    #[error("Invalid label format, must be a number.")]
    LabelFormat,
    /// Label value does not fit into 0..65535.
    #[error("Invalid label '{value}', must be a number 0..65535.")]
    LabelRange {
        /// The offending label text.
        value: String,
    },
    /// Label definition not followed by `:`.
    #[error("Invalid label definition, was expecting ':'.")]
    LabelSyntax,
    /// Label defined for a second time.
    #[error("Label '{label}' was already defined.")]
    LabelRedefined {
        /// The redefined label.
        label: u16,
    },
    /// No opcode where one was expected.
    #[error("Opcode expected.")]
    OpcodeMissing,
    /// Opcode is not part of the instruction descriptor.
    #[error("Opcode '{opcode}' doesn't exist.")]
    OpcodeUnknown {
        /// The opcode after alias resolution.
        opcode: String,
    },
    /// A `/` that does not start `//` or `/*`.
    #[error("Start comments with '//' or '/*'.")]
    CommentFormat,
    /// Register token does not look like `R<number>`.
    #[error("Invalid register format '{token}'. Needs to be R<number> where number is 0-255.")]
    RegisterFormat {
        /// The offending token.
        token: String,
    },
    /// Register number above 255.
    #[error("Only registers 0-255 supported.")]
    RegisterRange {
        /// The offending register number.
        value: String,
    },
    /// Fixed-width value is not valid hex/decimal or too wide.
    #[error("Invalid {width} format.")]
    ByteFormat {
        /// Expected width of the value.
        width: Width,
    },
    /// Hex data block without a single byte.
    #[error("Was expecting hex data bytes.")]
    DataExpected,
    /// Float token does not match `-?[0-9.]+`.
    #[error("Invalid float number format.")]
    FloatFormat,
    /// Array token does not match `count:num1:num2:...`.
    #[error("Invalid array format '{token}'. Must be 'count:num1:num2:num3:...'")]
    ArrayFormat {
        /// The offending token.
        token: String,
    },
    /// Declared array count differs from the element count.
    #[error("Invalid array format, {count} elements are required.")]
    ArrayCountMismatch {
        /// The declared count as written.
        count: String,
    },
    /// No opening quote where a string was expected.
    #[error("Was expecting String.")]
    StringExpected,
    /// String runs to the end of the line.
    #[error("String has no closing quote.")]
    StringUnterminated,
    /// No `,` between two arguments.
    #[error("Was expecting separator ','.")]
    SeparatorExpected,
}

/// Parse error with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error line {line}, position {column}: {kind}")]
pub struct ParseError {
    /// Kind of parse error.
    pub kind: ParseErrorKind,
    /// 1-indexed line number.
    pub line: usize,
    /// 0-indexed character column.
    pub column: usize,
    /// The offending line as read.
    pub text: String,
}

impl ParseError {
    /// Creates an error at byte offset `pos` of `text`.
    ///
    /// The byte offset is converted to a character column so the caret lines
    /// up with non-ASCII source.
    #[must_use]
    pub fn new(kind: ParseErrorKind, text: &str, line: usize, pos: usize) -> Self {
        let column = text
            .get(..pos)
            .map_or_else(|| text.chars().count(), |head| head.chars().count());

        Self {
            kind,
            line,
            column,
            text: text.to_string(),
        }
    }

    /// Renders the message, the offending line and a caret under the column.
    #[must_use]
    pub fn report(&self) -> String {
        format!("{self}\n{}\n{}^", self.text, self.caret_padding())
    }

    /// Whitespace that moves a caret under `column`, keeping tabs as tabs.
    #[must_use]
    pub fn caret_padding(&self) -> String {
        let mut padding: String = self
            .text
            .chars()
            .take(self.column)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let missing = self.column.saturating_sub(padding.chars().count());
        padding.push_str(&" ".repeat(missing));
        padding
    }
}

/// Result type used by the readers and the line loop.
pub type ParseResult<T> = Result<T, ParseError>;
