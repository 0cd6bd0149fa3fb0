//! Line-by-line PASM parser.
//!
//! [`Parser`] holds the state threaded from one line to the next: the
//! multi-line comment flag, the label tracker and the growing program. Each
//! call to [`Parser::parse_line`] handles one physical line; the first error
//! ends the run. [`Parser::finish`] runs the label check and hands back the
//! program.

use crate::builder::StatementBuilder;
use crate::descriptor::{AliasTable, InstructionDescriptor};
use crate::error::{ParseErrorKind, ParseResult};
use crate::labels::{LabelTracker, LabelWarning};
use crate::readers::read_label;
use crate::scanner::{skip_comment, skip_spaces, CommentState, Line};
use crate::statement::Program;

/// Opcode used for synthesized label stubs unless configured otherwise.
pub const DEFAULT_STUB_OPCODE: &str = "ret";

/// Options for the post-parse label check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Append a stub definition for every unresolved label reference.
    pub fix_labels: bool,
    /// Opcode of the synthesized stubs.
    pub stub_opcode: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fix_labels: false,
            stub_opcode: DEFAULT_STUB_OPCODE.to_string(),
        }
    }
}

/// Result of a complete parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// Parsed statements followed by any synthesized stubs.
    pub program: Program,
    /// One warning per unresolved label reference.
    pub warnings: Vec<LabelWarning>,
}

/// Incremental parser over a sequence of lines.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    builder: StatementBuilder<'a>,
    comments: CommentState,
    labels: LabelTracker,
    program: Program,
    line_number: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over the given instruction tables.
    #[must_use]
    pub fn new(descriptor: &'a InstructionDescriptor, aliases: &'a AliasTable) -> Self {
        Self {
            builder: StatementBuilder::new(descriptor, aliases),
            comments: CommentState::default(),
            labels: LabelTracker::new(),
            program: Program::new(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns true while a `/* ... */` comment is open.
    #[must_use]
    pub const fn in_block_comment(&self) -> bool {
        self.comments.in_block()
    }

    /// Statements parsed so far.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Parses the next physical line.
    ///
    /// # Errors
    ///
    /// Returns the first error found on the line. The parser must not be
    /// used any further after an error.
    pub fn parse_line(&mut self, text: &str) -> ParseResult<()> {
        self.line_number += 1;
        let line = Line::new(text, self.line_number);

        let mut pos = skip_spaces(text, 0);
        if line.at_end(pos) {
            return Ok(());
        }

        if self.comments.in_block() {
            self.comments.scan_for_close(text, pos);
            return Ok(());
        }

        if line.peek(pos) == Some('/') {
            let comment = skip_comment(&line, pos)?;
            self.comments.enter(comment);
            return Ok(());
        }

        let mut label = None;
        if line.peek(pos).is_some_and(|c| c.is_ascii_digit()) {
            let (value, next) = self.read_label_definition(&line, pos)?;
            label = Some(value);
            pos = skip_spaces(text, next);
        }

        if line.at_end(pos) {
            return Err(line.error(pos, ParseErrorKind::OpcodeMissing));
        }

        let (statement, next) = self.builder.build(&line, pos, label, &mut self.labels)?;
        self.program.push(statement);

        let pos = skip_spaces(text, next);
        if line.peek(pos) == Some('/') {
            let comment = skip_comment(&line, pos)?;
            self.comments.enter(comment);
        }

        Ok(())
    }

    /// Parses `<label>:` at `pos` and records the definition.
    fn read_label_definition(&mut self, line: &Line<'_>, pos: usize) -> ParseResult<(u16, usize)> {
        let (label, next) = read_label(line, pos)?;

        if line.peek(next) != Some(':') {
            return Err(line.error(next, ParseErrorKind::LabelSyntax));
        }

        if !self.labels.define(label) {
            return Err(line.error(pos, ParseErrorKind::LabelRedefined { label }));
        }

        Ok((label, next + 1))
    }

    /// Ends the main pass and checks label references.
    #[must_use]
    pub fn finish(self, options: &ParseOptions) -> ParseOutput {
        let Self {
            labels,
            mut program,
            ..
        } = self;

        let stub_opcode = options
            .fix_labels
            .then_some(options.stub_opcode.as_str());
        let warnings = labels.check(&mut program, stub_opcode);

        ParseOutput { program, warnings }
    }
}

/// Parses a whole source text.
///
/// Lines are split on `\n` and `\r\n`. Parsing stops at the first error; on
/// success the label check has already been applied.
///
/// # Errors
///
/// Returns the first [`ParseError`](crate::error::ParseError) found.
pub fn parse_source(
    source: &str,
    descriptor: &InstructionDescriptor,
    aliases: &AliasTable,
    options: &ParseOptions,
) -> ParseResult<ParseOutput> {
    let mut parser = Parser::new(descriptor, aliases);
    for line in source.lines() {
        parser.parse_line(line)?;
    }
    Ok(parser.finish(options))
}
