//! Statement builder: opcode lookup and per-grammar argument parsing.

use crate::descriptor::{AliasTable, InstructionDescriptor};
use crate::error::{ParseErrorKind, ParseResult};
use crate::labels::LabelTracker;
use crate::readers::{read_argument, read_separator};
use crate::scanner::{read, skip_spaces, Line};
use crate::statement::Statement;

/// Builds statements from the opcode position of a line.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    descriptor: &'a InstructionDescriptor,
    aliases: &'a AliasTable,
}

impl<'a> StatementBuilder<'a> {
    /// Creates a builder over the given tables.
    #[must_use]
    pub const fn new(descriptor: &'a InstructionDescriptor, aliases: &'a AliasTable) -> Self {
        Self {
            descriptor,
            aliases,
        }
    }

    /// Parses the opcode at `pos` and its arguments.
    ///
    /// The opcode is resolved through the alias table, then its grammar
    /// drives the argument readers with a `,` between consecutive arguments.
    /// Label references are recorded in `labels`. Returns the statement and
    /// the position after the last argument.
    ///
    /// # Errors
    ///
    /// `OpcodeMissing` if no opcode starts at `pos`, `OpcodeUnknown` if the
    /// opcode is not described, or the first argument reader error.
    pub fn build(
        &self,
        line: &Line<'_>,
        pos: usize,
        label: Option<u16>,
        labels: &mut LabelTracker,
    ) -> ParseResult<(Statement, usize)> {
        let (token, mut pos) = read(line.text, pos, |c| !c.is_whitespace());
        if token.is_empty() {
            return Err(line.error(pos, ParseErrorKind::OpcodeMissing));
        }

        let opcode = self.aliases.resolve(token);
        let grammar = self.descriptor.grammar(opcode).ok_or_else(|| {
            line.error(
                pos - token.len(),
                ParseErrorKind::OpcodeUnknown {
                    opcode: opcode.to_string(),
                },
            )
        })?;

        pos = skip_spaces(line.text, pos);
        let mut arguments = Vec::with_capacity(grammar.len());

        for (i, &kind) in grammar.iter().enumerate() {
            let (argument, next) = read_argument(kind, line, pos)?;
            pos = next;

            if kind.references_labels() {
                for target in argument.label_references() {
                    labels.reference(target);
                }
            }
            arguments.push(argument);

            if i + 1 < grammar.len() {
                pos = skip_spaces(line.text, pos);
                pos = read_separator(line, pos)?;
                pos = skip_spaces(line.text, pos);
            }
        }

        Ok((Statement::new(label, opcode, arguments), pos))
    }
}
