//! Instruction descriptor and alias table files.
//!
//! Both tables are plain text, one entry per line. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # opcode  argument kinds
//! leti      register, dword
//! switch_jmp register, label_array
//! ```
//!
//! The alias table holds `<legacy> <canonical>` pairs. The default tables are
//! compiled into the binary.

use std::fmt;

use pasm_core::{AliasTable, ArgKind, InstructionDescriptor};

const DEFAULT_OPCODES: &str = include_str!("../data/opcodes.tbl");
const DEFAULT_ALIASES: &str = include_str!("../data/aliases.tbl");

/// A malformed table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    /// Kind of table error.
    pub kind: TableErrorKind,
    /// 1-indexed line number in the table text.
    pub line: usize,
}

/// Classification of table errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableErrorKind {
    /// Argument kind name that is not known.
    UnknownKind(String),
    /// Empty entry in a comma separated kind list.
    EmptyKind,
    /// Name defined twice.
    Duplicate(String),
    /// Alias line without exactly two names.
    MalformedAlias,
}

impl fmt::Display for TableErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(name) => write!(f, "unknown argument kind '{name}'"),
            Self::EmptyKind => write!(f, "empty argument kind"),
            Self::Duplicate(name) => write!(f, "'{name}' is defined more than once"),
            Self::MalformedAlias => write!(f, "expected '<legacy> <canonical>'"),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for TableError {}

/// Non-comment lines with their 1-indexed line numbers.
fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Parses an instruction descriptor table.
///
/// # Errors
///
/// Returns a [`TableError`] for unknown kinds, empty kinds and duplicate
/// opcodes.
pub fn parse_descriptor(text: &str) -> Result<InstructionDescriptor, TableError> {
    let mut descriptor = InstructionDescriptor::new();

    for (line, entry) in entries(text) {
        let (opcode, rest) = entry
            .split_once(char::is_whitespace)
            .map_or((entry, ""), |(opcode, rest)| (opcode, rest.trim()));

        let kinds = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',')
                .map(|name| parse_kind(name.trim(), line))
                .collect::<Result<Vec<_>, _>>()?
        };

        if descriptor.insert(opcode, kinds).is_some() {
            return Err(TableError {
                kind: TableErrorKind::Duplicate(opcode.to_string()),
                line,
            });
        }
    }

    Ok(descriptor)
}

fn parse_kind(name: &str, line: usize) -> Result<ArgKind, TableError> {
    if name.is_empty() {
        return Err(TableError {
            kind: TableErrorKind::EmptyKind,
            line,
        });
    }

    ArgKind::from_name(name).ok_or_else(|| TableError {
        kind: TableErrorKind::UnknownKind(name.to_string()),
        line,
    })
}

/// Parses an alias table.
///
/// # Errors
///
/// Returns a [`TableError`] for lines without exactly two names and for
/// legacy names listed twice.
pub fn parse_aliases(text: &str) -> Result<AliasTable, TableError> {
    let mut aliases = AliasTable::new();

    for (line, entry) in entries(text) {
        let mut names = entry.split_whitespace();
        let (Some(legacy), Some(canonical), None) = (names.next(), names.next(), names.next())
        else {
            return Err(TableError {
                kind: TableErrorKind::MalformedAlias,
                line,
            });
        };

        if aliases.insert(legacy, canonical).is_some() {
            return Err(TableError {
                kind: TableErrorKind::Duplicate(legacy.to_string()),
                line,
            });
        }
    }

    Ok(aliases)
}

/// The built-in instruction descriptor.
///
/// # Errors
///
/// Returns a [`TableError`] if the embedded table is malformed.
pub fn default_descriptor() -> Result<InstructionDescriptor, TableError> {
    parse_descriptor(DEFAULT_OPCODES)
}

/// The built-in alias table.
///
/// # Errors
///
/// Returns a [`TableError`] if the embedded table is malformed.
pub fn default_aliases() -> Result<AliasTable, TableError> {
    parse_aliases(DEFAULT_ALIASES)
}
