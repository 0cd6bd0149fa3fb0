//! Core parser and validator for PASM script listings.
//!
//! Source lines are parsed against an [`InstructionDescriptor`] into a
//! [`Program`] of canonical [`Statement`]s. Label jumps are checked once all
//! lines are in, optionally appending stub definitions for missing targets.

/// Parse error kinds and the positioned error type.
pub mod error;
pub use error::{ParseError, ParseErrorKind, ParseResult};

/// Instruction grammars, argument kinds and the legacy opcode alias table.
pub mod descriptor;
pub use descriptor::{AliasTable, ArgKind, InstructionDescriptor, Width};

/// Low-level line scanning and comment handling.
pub mod scanner;
pub use scanner::{Comment, CommentState, Line};

/// Parsed statement model and its canonical text form.
pub mod statement;
pub use statement::{Argument, FixedBytes, NumberArray, Program, Register, Statement};

/// Per-kind argument readers.
pub mod readers;

/// Opcode resolution and argument sequencing for one statement.
pub mod builder;
pub use builder::StatementBuilder;

/// Label definition and reference bookkeeping.
pub mod labels;
pub use labels::{LabelTracker, LabelWarning};

/// Line-by-line parser state machine.
pub mod parser;
pub use parser::{parse_source, ParseOptions, ParseOutput, Parser, DEFAULT_STUB_OPCODE};

#[cfg(test)]
use proptest as _;
